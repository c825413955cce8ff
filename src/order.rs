//! Orders and splitting them into secret-shared fragments.
//!
//! An [`Order`] never leaves the trader. [`Order::split`] turns it into `n`
//! [`OrderFragment`]s, one per darknode, where fragment `i` carries the `i`-th Shamir
//! share of every numeric field.

use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::error::Result;
use crate::field::Prime;
use crate::order_fragment::OrderFragment;
use crate::sss;
use crate::types::{keccak256, CurrencyCode, OrderId, OrderParity, OrderType};

/// Trade order (trader side, plaintext).
///
/// Numeric fields are `u64`, so every value stays far below `P / 2` for any field
/// of at least 66 bits and the sign test in [`crate::Delta::is_match`] stays sound.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_type: OrderType,
    pub parity: OrderParity,
    /// Unix seconds after which the order is void.
    pub expiry: Option<u64>,
    pub fst_code: CurrencyCode,
    pub snd_code: CurrencyCode,
    pub price: u64,
    pub max_volume: u64,
    pub min_volume: u64,
    pub nonce: u64,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_type: OrderType,
        parity: OrderParity,
        expiry: Option<u64>,
        fst_code: CurrencyCode,
        snd_code: CurrencyCode,
        price: u64,
        max_volume: u64,
        min_volume: u64,
        nonce: u64,
    ) -> Self {
        let mut order = Self {
            id: OrderId([0; 32]),
            order_type,
            parity,
            expiry,
            fst_code,
            snd_code,
            price,
            max_volume,
            min_volume,
            nonce,
        };
        order.id = order.content_id();
        order
    }

    /// Keccak-256 over every field except the id itself.
    pub fn content_id(&self) -> OrderId {
        let mut buf = Vec::with_capacity(59);
        buf.push(self.order_type.tag());
        buf.push(self.parity.tag());
        buf.push(self.expiry.is_some() as u8);
        buf.extend_from_slice(&self.expiry.unwrap_or(0).to_be_bytes());
        buf.extend_from_slice(&self.fst_code.0.to_be_bytes());
        buf.extend_from_slice(&self.snd_code.0.to_be_bytes());
        buf.extend_from_slice(&self.price.to_be_bytes());
        buf.extend_from_slice(&self.max_volume.to_be_bytes());
        buf.extend_from_slice(&self.min_volume.to_be_bytes());
        buf.extend_from_slice(&self.nonce.to_be_bytes());
        OrderId(keccak256(&[buf.as_slice()]))
    }

    pub fn is_expired(&self, now_secs: u64) -> bool {
        self.expiry.map(|e| now_secs >= e).unwrap_or(false)
    }

    /// Buy/sell pairs are the only orders that can match.
    pub fn is_compatible(&self, other: &Order) -> bool {
        self.parity != other.parity
    }

    /// Splits the order into `n` fragments, any `k` of which reconstruct each field.
    pub fn split(&self, n: u64, k: u64, prime: &Prime) -> Result<Vec<OrderFragment>> {
        self.split_with_rng(&mut OsRng, n, k, prime)
    }

    /// Like [`Order::split`], drawing polynomial coefficients from `rng`.
    pub fn split_with_rng<R>(
        &self,
        rng: &mut R,
        n: u64,
        k: u64,
        prime: &Prime,
    ) -> Result<Vec<OrderFragment>>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let fst = sss::encode_with_rng(rng, &BigUint::from(self.fst_code.0), n, k, prime)?;
        let snd = sss::encode_with_rng(rng, &BigUint::from(self.snd_code.0), n, k, prime)?;
        let price = sss::encode_with_rng(rng, &BigUint::from(self.price), n, k, prime)?;
        let max_volume = sss::encode_with_rng(rng, &BigUint::from(self.max_volume), n, k, prime)?;
        let min_volume = sss::encode_with_rng(rng, &BigUint::from(self.min_volume), n, k, prime)?;

        let fragments = fst
            .into_iter()
            .zip(snd)
            .zip(price)
            .zip(max_volume)
            .zip(min_volume)
            .map(|((((fst, snd), price), max_volume), min_volume)| {
                OrderFragment::new(
                    self.id,
                    self.order_type,
                    self.parity,
                    fst,
                    snd,
                    price,
                    max_volume,
                    min_volume,
                )
            })
            .collect();
        Ok(fragments)
    }
}
