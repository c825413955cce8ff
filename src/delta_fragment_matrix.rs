//! Pairs every buy order fragment with every sell order fragment known to this darknode.
//!
//! Each fragment moves through `absent -> live -> completed`. Inserting a live fragment
//! computes a [`DeltaFragment`] against every live fragment of the opposite parity;
//! removing it marks its id completed so the same fragment can never be paired again.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};

use log::debug;

use crate::delta::DeltaFragment;
use crate::error::Result;
use crate::field::Prime;
use crate::order_fragment::OrderFragment;
use crate::types::{OrderFragmentId, OrderParity};

/// Sell fragment id -> delta fragment computed against one buy fragment.
type SellRow = HashMap<OrderFragmentId, DeltaFragment>;

#[derive(Debug, Default)]
struct MatrixState {
    buy_fragments: HashMap<OrderFragmentId, OrderFragment>,
    sell_fragments: HashMap<OrderFragmentId, OrderFragment>,
    /// Buy fragment id -> row of delta fragments.
    rows: HashMap<OrderFragmentId, SellRow>,
    completed: HashSet<OrderFragmentId>,
}

impl MatrixState {
    fn is_known(&self, id: &OrderFragmentId) -> bool {
        self.completed.contains(id)
            || self.buy_fragments.contains_key(id)
            || self.sell_fragments.contains_key(id)
    }
}

/// Buy x sell matrix of delta fragments. Safe to share between threads.
#[derive(Debug)]
pub struct DeltaFragmentMatrix {
    prime: Prime,
    state: RwLock<MatrixState>,
}

impl DeltaFragmentMatrix {
    pub fn new(prime: Prime) -> Self {
        Self {
            prime,
            state: RwLock::new(MatrixState::default()),
        }
    }

    /// Inserts a fragment and returns the delta fragments it produced.
    ///
    /// Re-inserting a live or completed fragment is a no-op returning nothing. On error
    /// the matrix is left unchanged.
    pub fn insert_order_fragment(&self, fragment: OrderFragment) -> Result<Vec<DeltaFragment>> {
        match fragment.parity {
            OrderParity::Buy => self.insert_buy(fragment),
            OrderParity::Sell => self.insert_sell(fragment),
        }
    }

    fn insert_buy(&self, buy: OrderFragment) -> Result<Vec<DeltaFragment>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_known(&buy.id) {
            return Ok(Vec::new());
        }

        let mut row = SellRow::with_capacity(state.sell_fragments.len());
        for (sell_id, sell) in &state.sell_fragments {
            row.insert(*sell_id, buy.sub(sell, &self.prime)?);
        }
        let created: Vec<DeltaFragment> = row.values().cloned().collect();

        debug!("buy fragment {} paired with {} sell fragments", buy.id, created.len());
        state.rows.insert(buy.id, row);
        state.buy_fragments.insert(buy.id, buy);
        Ok(created)
    }

    fn insert_sell(&self, sell: OrderFragment) -> Result<Vec<DeltaFragment>> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.is_known(&sell.id) {
            return Ok(Vec::new());
        }

        let mut created = Vec::with_capacity(state.buy_fragments.len());
        for buy in state.buy_fragments.values() {
            created.push(buy.sub(&sell, &self.prime)?);
        }

        let mut inserted = Vec::with_capacity(created.len());
        for delta_fragment in created {
            if let Some(row) = state.rows.get_mut(&delta_fragment.buy_order_fragment_id) {
                row.insert(sell.id, delta_fragment.clone());
                inserted.push(delta_fragment);
            }
        }

        debug!("sell fragment {} paired with {} buy fragments", sell.id, inserted.len());
        state.sell_fragments.insert(sell.id, sell);
        Ok(inserted)
    }

    /// Stops pairing a fragment and blacklists its id. No-op unless the fragment is live.
    pub fn remove_order_fragment(&self, fragment: &OrderFragment) {
        match fragment.parity {
            OrderParity::Buy => self.remove_buy(&fragment.id),
            OrderParity::Sell => self.remove_sell(&fragment.id),
        }
    }

    fn remove_buy(&self, id: &OrderFragmentId) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.buy_fragments.remove(id).is_none() {
            return;
        }
        state.rows.remove(id);
        state.completed.insert(*id);
        debug!("buy fragment {} completed", id);
    }

    fn remove_sell(&self, id: &OrderFragmentId) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.sell_fragments.remove(id).is_none() {
            return;
        }
        for row in state.rows.values_mut() {
            row.remove(id);
        }
        state.completed.insert(*id);
        debug!("sell fragment {} completed", id);
    }

    /// Delta fragment for one buy/sell pair, if both are live.
    pub fn get_delta_fragment(
        &self,
        buy: &OrderFragmentId,
        sell: &OrderFragmentId,
    ) -> Option<DeltaFragment> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.rows.get(buy).and_then(|row| row.get(sell)).cloned()
    }

    pub fn is_live(&self, id: &OrderFragmentId) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.buy_fragments.contains_key(id) || state.sell_fragments.contains_key(id)
    }

    pub fn is_completed(&self, id: &OrderFragmentId) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.completed.contains(id)
    }

    /// Number of live buy fragments.
    pub fn buy_len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.buy_fragments.len()
    }

    /// Number of live sell fragments.
    pub fn sell_len(&self) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.sell_fragments.len()
    }
}
