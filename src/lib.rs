//! # Darkpool Compute
//!
//! Secret-shared order matching for a pool of darknodes. Traders split orders into
//! Shamir shares, one per darknode; darknodes subtract buy and sell shares pairwise and
//! reconstruct only the differences, never the orders themselves.
//!
//! ## Entry point
//!
//! Use [`Epoch`] as the single entry point for one darknode: create it with
//! [`Epoch::new`], then feed it [`Epoch::submit_order_fragment`] and
//! [`Epoch::submit_delta_fragment`] as fragments arrive.
//!
//! ## Example
//!
//! ```rust
//! use darkpool_compute::{CurrencyCode, Epoch, EpochConfig, Order, OrderParity, OrderType};
//!
//! let config = EpochConfig::with_share_count(0, 1).unwrap();
//! let epoch = Epoch::new(config.clone()).unwrap();
//! let order = |parity| {
//!     Order::new(OrderType::Limit, parity, None, CurrencyCode::BTC, CurrencyCode::ETH, 10, 1000, 100, 1)
//! };
//! let buy = order(OrderParity::Buy).split(1, 1, &config.prime).unwrap().remove(0);
//! let sell = order(OrderParity::Sell).split(1, 1, &config.prime).unwrap().remove(0);
//! epoch.submit_order_fragment(buy).unwrap();
//! let created = epoch.submit_order_fragment(sell).unwrap();
//! let delta = epoch.delta(&created[0].delta_id()).unwrap();
//! assert!(delta.is_match(&config.prime));
//! ```
//!
//! ## Lower-level API
//!
//! [`sss`], [`DeltaFragmentMatrix`] and [`DeltaBuilder`] can be used directly when the
//! caller manages epochs itself.

pub mod api;
pub mod config;
pub mod delta;
pub mod delta_builder;
pub mod delta_fragment_matrix;
pub mod epoch;
pub mod error;
pub mod field;
pub mod generator;
pub mod match_sink;
pub mod order;
pub mod order_fragment;
pub mod sss;
pub mod types;

pub use config::{default_threshold, EpochConfig};
pub use delta::{Delta, DeltaFragment};
pub use delta_builder::{DeltaBuilder, Reconstruction};
pub use delta_fragment_matrix::DeltaFragmentMatrix;
pub use epoch::Epoch;
pub use error::{Error, Result};
pub use field::Prime;
pub use generator::{Generator, GeneratorConfig};
pub use match_sink::{InMemoryMatchSink, LogMatchSink, MatchEvent, MatchSink};
pub use order::Order;
pub use order_fragment::OrderFragment;
pub use sss::Share;
pub use types::{CurrencyCode, DeltaFragmentId, DeltaId, OrderFragmentId, OrderId, OrderParity, OrderType};
