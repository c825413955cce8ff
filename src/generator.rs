//! Synthetic order generator.
//!
//! Deterministic, configurable order stream for property tests, demos and benchmarks.
//! Same seed ⇒ same sequence of orders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::order::Order;
use crate::types::{CurrencyCode, OrderParity, OrderType};

/// Configuration for the synthetic order generator.
/// All ranges are inclusive; reversed bounds are swapped. Same config + seed produces
/// the same stream.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed ⇒ same order stream.
    pub seed: u64,
    /// Number of orders returned by [`Generator::all_orders`].
    pub num_orders: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    pub price_min: u64,
    pub price_max: u64,
    pub volume_min: u64,
    pub volume_max: u64,
    /// Currency pairs to draw from (first, second).
    pub pairs: Vec<(CurrencyCode, CurrencyCode)>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_orders: 100,
            buy_ratio: 0.5,
            price_min: 95,
            price_max: 105,
            volume_min: 1,
            volume_max: 1000,
            pairs: vec![
                (CurrencyCode::BTC, CurrencyCode::ETH),
                (CurrencyCode::ETH, CurrencyCode::REN),
            ],
        }
    }
}

/// Deterministic order stream. Create with [`Generator::new`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_nonce: u64,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_nonce: 1,
        }
    }

    /// Generates the next order. Nonces increase, so every order id is distinct.
    pub fn next_order(&mut self) -> Order {
        let parity = if self.rng.gen::<f64>() < self.config.buy_ratio {
            OrderParity::Buy
        } else {
            OrderParity::Sell
        };
        let (fst, snd) = if self.config.pairs.is_empty() {
            (CurrencyCode::BTC, CurrencyCode::ETH)
        } else {
            self.config.pairs[self.rng.gen_range(0..self.config.pairs.len())]
        };
        let (price_lo, price_hi) = bounds(self.config.price_min, self.config.price_max);
        let (volume_lo, volume_hi) = bounds(self.config.volume_min, self.config.volume_max);
        let price = self.rng.gen_range(price_lo..=price_hi);
        let a = self.rng.gen_range(volume_lo..=volume_hi);
        let b = self.rng.gen_range(volume_lo..=volume_hi);
        let nonce = self.next_nonce;
        self.next_nonce += 1;
        Order::new(
            OrderType::Limit,
            parity,
            None,
            fst,
            snd,
            price,
            a.max(b),
            a.min(b),
            nonce,
        )
    }

    pub fn take_orders(&mut self, n: usize) -> Vec<Order> {
        (0..n).map(|_| self.next_order()).collect()
    }

    /// Returns `config.num_orders` orders.
    pub fn all_orders(&mut self) -> Vec<Order> {
        self.take_orders(self.config.num_orders)
    }
}

fn bounds(a: u64, b: u64) -> (u64, u64) {
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let c = GeneratorConfig {
            seed: 42,
            num_orders: 10,
            ..Default::default()
        };
        let orders1 = Generator::new(c.clone()).all_orders();
        let orders2 = Generator::new(c).all_orders();
        assert_eq!(orders1.len(), 10);
        assert_eq!(orders1, orders2);
    }

    #[test]
    fn different_seed_different_stream() {
        let o1 = Generator::new(GeneratorConfig {
            seed: 1,
            num_orders: 5,
            ..Default::default()
        })
        .all_orders();
        let o2 = Generator::new(GeneratorConfig {
            seed: 2,
            num_orders: 5,
            ..Default::default()
        })
        .all_orders();
        assert_ne!(o1, o2);
    }

    #[test]
    fn orders_respect_ranges() {
        let orders = Generator::new(GeneratorConfig {
            seed: 3,
            num_orders: 50,
            ..Default::default()
        })
        .all_orders();
        for o in &orders {
            assert!((95..=105).contains(&o.price));
            assert!(o.min_volume <= o.max_volume);
            assert_eq!(o.id, o.content_id());
        }
    }

    #[test]
    fn buy_ratio_one_gives_only_buys() {
        let orders = Generator::new(GeneratorConfig {
            buy_ratio: 1.0,
            num_orders: 20,
            ..Default::default()
        })
        .all_orders();
        assert!(orders.iter().all(|o| o.parity == OrderParity::Buy));
    }

    #[test]
    fn reversed_bounds_are_swapped() {
        let orders = Generator::new(GeneratorConfig {
            num_orders: 20,
            price_min: 105,
            price_max: 95,
            volume_min: 50,
            volume_max: 10,
            ..Default::default()
        })
        .all_orders();
        for o in &orders {
            assert!((95..=105).contains(&o.price));
            assert!((10..=50).contains(&o.min_volume));
            assert!(o.min_volume <= o.max_volume && o.max_volume <= 50);
        }
    }
}
