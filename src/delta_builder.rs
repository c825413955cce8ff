//! Collects delta fragments broadcast by the pool and reconstructs deltas.
//!
//! Fragments are grouped by [`DeltaId`]. When `k` distinct fragments for one id have
//! arrived the [`Delta`] is interpolated once and cached; later fragments for that id
//! only return the cached value.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use log::debug;

use crate::delta::{Delta, DeltaFragment};
use crate::error::{Error, Result};
use crate::field::Prime;
use crate::types::{DeltaFragmentId, DeltaId};

/// Outcome of feeding one fragment to the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconstruction {
    /// Fewer than `k` fragments collected so far.
    Pending,
    /// This fragment completed the delta.
    Reconstructed(Delta),
    /// The delta had already been reconstructed.
    Cached(Delta),
}

impl Reconstruction {
    pub fn into_delta(self) -> Option<Delta> {
        match self {
            Reconstruction::Pending => None,
            Reconstruction::Reconstructed(delta) | Reconstruction::Cached(delta) => Some(delta),
        }
    }
}

#[derive(Debug, Default)]
struct BuilderState {
    seen: HashSet<DeltaFragmentId>,
    collected: HashMap<DeltaId, Vec<DeltaFragment>>,
    deltas: HashMap<DeltaId, Delta>,
}

/// Threshold accumulator for delta fragments. Safe to share between threads.
#[derive(Debug)]
pub struct DeltaBuilder {
    k: usize,
    prime: Prime,
    state: RwLock<BuilderState>,
}

impl DeltaBuilder {
    /// Fails with [`Error::Nk`] when `k` is zero.
    pub fn new(k: u64, prime: Prime) -> Result<Self> {
        if k == 0 {
            return Err(Error::Nk { n: 0, k });
        }
        Ok(Self {
            k: k as usize,
            prime,
            state: RwLock::new(BuilderState::default()),
        })
    }

    /// Adds a fragment and returns the delta once `k` fragments for its pair are known.
    pub fn insert_delta_fragment(&self, fragment: DeltaFragment) -> Result<Option<Delta>> {
        Ok(self.insert(fragment)?.into_delta())
    }

    /// Like [`DeltaBuilder::insert_delta_fragment`], telling a fresh reconstruction
    /// apart from a cached one.
    pub fn insert(&self, fragment: DeltaFragment) -> Result<Reconstruction> {
        let delta_id = fragment.delta_id();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(delta) = state.deltas.get(&delta_id) {
            return Ok(Reconstruction::Cached(delta.clone()));
        }
        if state.seen.contains(&fragment.id) {
            return Ok(Reconstruction::Pending);
        }

        let collected = state.collected.entry(delta_id).or_default();
        // collected fragments always hold pairwise distinct keys
        if let Some(key) = collected.iter().find_map(|c| shared_key(c, &fragment)) {
            debug!("delta {} already has a fragment with key {}", delta_id, key);
            return Err(Error::DuplicateShareKey(key));
        }
        if collected.len() + 1 >= self.k {
            let mut fragments = collected.clone();
            fragments.push(fragment.clone());
            fragments.truncate(self.k);
            // a failed interpolation leaves the fragment unrecorded
            let delta = Delta::new(&fragments, &self.prime)?;
            debug!("delta {} reconstructed from {} fragments", delta_id, fragments.len());
            state.collected.remove(&delta_id);
            state.seen.insert(fragment.id);
            state.deltas.insert(delta_id, delta.clone());
            return Ok(Reconstruction::Reconstructed(delta));
        }

        collected.push(fragment.clone());
        let count = collected.len();
        state.seen.insert(fragment.id);
        debug!("delta {} has {}/{} fragments", delta_id, count, self.k);
        Ok(Reconstruction::Pending)
    }

    pub fn has_delta(&self, id: &DeltaId) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.deltas.contains_key(id)
    }

    pub fn delta(&self, id: &DeltaId) -> Option<Delta> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.deltas.get(id).cloned()
    }

    /// Fragments collected for a delta that is not reconstructed yet.
    pub fn pending_len(&self, id: &DeltaId) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.collected.get(id).map(Vec::len).unwrap_or(0)
    }

    pub fn threshold(&self) -> u64 {
        self.k as u64
    }
}

/// First key that `a` and `b` use for the same field, if any.
fn shared_key(a: &DeltaFragment, b: &DeltaFragment) -> Option<u64> {
    let pairs = [
        (&a.fst_code_share, &b.fst_code_share),
        (&a.snd_code_share, &b.snd_code_share),
        (&a.price_share, &b.price_share),
        (&a.max_volume_share, &b.max_volume_share),
        (&a.min_volume_share, &b.min_volume_share),
    ];
    pairs.iter().find(|(x, y)| x.key == y.key).map(|(x, _)| x.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Order;
    use num_bigint::BigUint;
    use crate::types::{CurrencyCode, OrderParity, OrderType};

    const N: u64 = 5;
    const K: u64 = 3;

    fn order(parity: OrderParity, price: u64) -> Order {
        Order::new(OrderType::Limit, parity, None, CurrencyCode::BTC, CurrencyCode::ETH, price, 1000, 100, 1)
    }

    fn fragments(buy_price: u64, sell_price: u64, prime: &Prime) -> Vec<DeltaFragment> {
        let buys = order(OrderParity::Buy, buy_price).split(N, K, prime).unwrap();
        let sells = order(OrderParity::Sell, sell_price).split(N, K, prime).unwrap();
        buys.iter().zip(sells.iter()).map(|(b, s)| b.sub(s, prime).unwrap()).collect()
    }

    #[test]
    fn reconstructs_at_threshold() {
        let prime = Prime::default();
        let builder = DeltaBuilder::new(K, prime.clone()).unwrap();
        let fs = fragments(10, 10, &prime);
        assert_eq!(builder.insert_delta_fragment(fs[0].clone()).unwrap(), None);
        assert_eq!(builder.insert_delta_fragment(fs[1].clone()).unwrap(), None);
        assert_eq!(builder.pending_len(&fs[0].delta_id()), 2);
        let delta = builder.insert_delta_fragment(fs[2].clone()).unwrap().unwrap();
        assert!(delta.is_match(&prime));
        assert!(builder.has_delta(&fs[0].delta_id()));
        assert_eq!(builder.pending_len(&fs[0].delta_id()), 0);
    }

    #[test]
    fn duplicates_do_not_count_toward_threshold() {
        let prime = Prime::default();
        let builder = DeltaBuilder::new(K, prime.clone()).unwrap();
        let fs = fragments(10, 10, &prime);
        for _ in 0..5 {
            assert_eq!(builder.insert_delta_fragment(fs[0].clone()).unwrap(), None);
        }
        assert_eq!(builder.pending_len(&fs[0].delta_id()), 1);
    }

    #[test]
    fn later_fragments_return_cached_delta() {
        let prime = Prime::default();
        let builder = DeltaBuilder::new(K, prime.clone()).unwrap();
        let fs = fragments(12, 10, &prime);
        let mut first = None;
        for f in &fs[..3] {
            first = builder.insert_delta_fragment(f.clone()).unwrap();
        }
        let first = first.unwrap();
        match builder.insert(fs[3].clone()).unwrap() {
            Reconstruction::Cached(delta) => assert_eq!(delta, first),
            other => panic!("expected cached delta, got {:?}", other),
        }
        assert_eq!(builder.insert_delta_fragment(fs[0].clone()).unwrap(), Some(first.clone()));
        assert_eq!(builder.delta(&first.id), Some(first));
    }

    #[test]
    fn pairs_accumulate_independently() {
        let prime = Prime::default();
        let builder = DeltaBuilder::new(K, prime.clone()).unwrap();
        let a = fragments(10, 10, &prime);
        let b = fragments(10, 11, &prime);
        assert_ne!(a[0].delta_id(), b[0].delta_id());
        builder.insert_delta_fragment(a[0].clone()).unwrap();
        builder.insert_delta_fragment(b[0].clone()).unwrap();
        builder.insert_delta_fragment(a[1].clone()).unwrap();
        assert!(builder.insert_delta_fragment(b[1].clone()).unwrap().is_none());
        assert!(builder.insert_delta_fragment(a[2].clone()).unwrap().unwrap().is_match(&prime));
        assert!(!builder.insert_delta_fragment(b[2].clone()).unwrap().unwrap().is_match(&prime));
    }

    #[test]
    fn failed_reconstruction_is_not_recorded() {
        let prime = Prime::default();
        let builder = DeltaBuilder::new(2, prime.clone()).unwrap();
        let fs = fragments(10, 10, &prime);
        let mut forged = fs[1].clone();
        forged.id = DeltaFragmentId([9; 32]);
        forged.price_share.key = fs[0].price_share.key;
        builder.insert_delta_fragment(fs[0].clone()).unwrap();
        let err = builder.insert_delta_fragment(forged).unwrap_err();
        assert!(matches!(err, Error::DuplicateShareKey(_)));
        assert_eq!(builder.pending_len(&fs[0].delta_id()), 1);
        assert!(builder.insert_delta_fragment(fs[1].clone()).unwrap().is_some());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let err = DeltaBuilder::new(0, Prime::default()).unwrap_err();
        assert_eq!(err, Error::Nk { n: 0, k: 0 });
    }

    #[test]
    fn fragment_reusing_a_collected_key_does_not_block_reconstruction() {
        let prime = Prime::default();
        let builder = DeltaBuilder::new(K, prime.clone()).unwrap();
        let buys = order(OrderParity::Buy, 11).split(N, K, &prime).unwrap();
        // the same sell order split twice: one order pair, two sets of keys 1..=N
        let sell = order(OrderParity::Sell, 10);
        let sells_a = sell.split(N, K, &prime).unwrap();
        let sells_b = sell.split(N, K, &prime).unwrap();
        let honest: Vec<DeltaFragment> =
            buys.iter().zip(sells_a.iter()).map(|(b, s)| b.sub(s, &prime).unwrap()).collect();
        let resplit = buys[0].sub(&sells_b[0], &prime).unwrap();
        assert_eq!(resplit.delta_id(), honest[0].delta_id());
        assert_ne!(resplit.id, honest[0].id);

        assert_eq!(builder.insert_delta_fragment(honest[0].clone()).unwrap(), None);
        let err = builder.insert_delta_fragment(resplit).unwrap_err();
        assert_eq!(err, Error::DuplicateShareKey(1));
        assert_eq!(builder.pending_len(&honest[0].delta_id()), 1);

        assert_eq!(builder.insert_delta_fragment(honest[1].clone()).unwrap(), None);
        let delta = builder.insert_delta_fragment(honest[2].clone()).unwrap().unwrap();
        assert_eq!(delta.price, BigUint::from(1u32));
        assert!(builder.has_delta(&honest[0].delta_id()));
    }
}
