//! Match signal: one event per reconstructed delta whose orders cross.
//!
//! Downstream consensus and settlement subscribe through a [`MatchSink`]. Events are
//! JSON with timestamp, epoch and the order pair.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use serde::Serialize;

use crate::delta::Delta;
use crate::types::{DeltaId, OrderId};

/// A buy and a sell order that matched inside one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct MatchEvent {
    /// Unix timestamp (seconds since epoch).
    pub timestamp_secs: u64,
    pub epoch: u64,
    pub delta_id: DeltaId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
}

impl MatchEvent {
    pub fn now(epoch: u64, delta: &Delta) -> Self {
        let timestamp_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            timestamp_secs,
            epoch,
            delta_id: delta.id,
            buy_order_id: delta.buy_order_id,
            sell_order_id: delta.sell_order_id,
        }
    }
}

/// Receiver of match events. Implementations forward to consensus, a log, or a test buffer.
pub trait MatchSink: Send + Sync {
    fn emit(&self, event: &MatchEvent);
}

/// Writes one JSON line per event through the `log` facade.
pub struct LogMatchSink;

impl MatchSink for LogMatchSink {
    fn emit(&self, event: &MatchEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            info!("match {}", line);
        }
    }
}

/// In-memory sink for tests. Clone shares the same backing buffer.
#[derive(Clone, Default)]
pub struct InMemoryMatchSink {
    events: Arc<Mutex<Vec<MatchEvent>>>,
}

impl InMemoryMatchSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MatchEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl MatchSink for InMemoryMatchSink {
    fn emit(&self, event: &MatchEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn delta() -> Delta {
        Delta {
            id: DeltaId([3; 32]),
            buy_order_id: OrderId([1; 32]),
            sell_order_id: OrderId([2; 32]),
            fst_code: BigUint::from(0u32),
            snd_code: BigUint::from(0u32),
            price: BigUint::from(0u32),
            max_volume: BigUint::from(0u32),
            min_volume: BigUint::from(0u32),
        }
    }

    #[test]
    fn in_memory_sink_shares_buffer_between_clones() {
        let sink = InMemoryMatchSink::new();
        let other = sink.clone();
        other.emit(&MatchEvent::now(4, &delta()));
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].epoch, 4);
        assert_eq!(events[0].delta_id, DeltaId([3; 32]));
        sink.clear();
        assert!(other.events().is_empty());
    }

    #[test]
    fn event_serializes_ids_as_hex() {
        let event = MatchEvent::now(1, &delta());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["buy_order_id"], serde_json::json!("01".repeat(32)));
        assert_eq!(json["epoch"], serde_json::json!(1));
    }
}
