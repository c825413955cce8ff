//! Epoch-scoped darknode computation facade.
//!
//! Holds the delta fragment matrix, the delta builder and the match sink for one epoch
//! so the network layer can hand over received fragments without wiring the pieces
//! itself. Create one [`Epoch`] when pool membership is fixed and drop it when the
//! epoch ends; nothing carries over.

use std::sync::Arc;

use log::{info, warn};

use crate::config::EpochConfig;
use crate::delta::{Delta, DeltaFragment};
use crate::delta_builder::{DeltaBuilder, Reconstruction};
use crate::delta_fragment_matrix::DeltaFragmentMatrix;
use crate::error::Result;
use crate::match_sink::{LogMatchSink, MatchEvent, MatchSink};
use crate::order_fragment::OrderFragment;
use crate::types::DeltaId;

/// One darknode's matching state for one epoch.
///
/// Every method takes `&self`; share it between handlers behind an `Arc`.
pub struct Epoch {
    config: EpochConfig,
    matrix: DeltaFragmentMatrix,
    builder: DeltaBuilder,
    sink: Arc<dyn MatchSink>,
}

impl Epoch {
    /// Creates an epoch that reports matches through the log.
    pub fn new(config: EpochConfig) -> Result<Self> {
        Self::with_sink(config, Arc::new(LogMatchSink))
    }

    pub fn with_sink(config: EpochConfig, sink: Arc<dyn MatchSink>) -> Result<Self> {
        let builder = DeltaBuilder::new(config.threshold, config.prime.clone())?;
        info!(
            "epoch started epoch={} share_count={} threshold={}",
            config.epoch, config.share_count, config.threshold
        );
        Ok(Self {
            matrix: DeltaFragmentMatrix::new(config.prime.clone()),
            builder,
            config,
            sink,
        })
    }

    pub fn config(&self) -> &EpochConfig {
        &self.config
    }

    /// Pairs an order fragment against the matrix and feeds each new delta fragment to
    /// the local builder. Returns the new delta fragments, which the caller broadcasts
    /// to the rest of the pool.
    ///
    /// Fails only if the matrix rejects the fragment. Once it is live, every created
    /// delta fragment is returned even if the local builder refuses some of them.
    pub fn submit_order_fragment(&self, fragment: OrderFragment) -> Result<Vec<DeltaFragment>> {
        info!(
            "order fragment received epoch={} id={} order_id={} parity={:?}",
            self.config.epoch, fragment.id, fragment.order_id, fragment.parity
        );
        let created = self.matrix.insert_order_fragment(fragment).map_err(|e| {
            warn!("order fragment rejected epoch={} error={}", self.config.epoch, e);
            e
        })?;
        for delta_fragment in &created {
            // already logged by submit_delta_fragment
            let _ = self.submit_delta_fragment(delta_fragment.clone());
        }
        info!(
            "order fragment paired epoch={} delta_fragments={}",
            self.config.epoch,
            created.len()
        );
        Ok(created)
    }

    /// Stops pairing an order fragment for the rest of the epoch.
    pub fn remove_order_fragment(&self, fragment: &OrderFragment) {
        self.matrix.remove_order_fragment(fragment);
        info!(
            "order fragment completed epoch={} id={}",
            self.config.epoch, fragment.id
        );
    }

    /// Feeds a delta fragment (local or from a peer) to the builder. Emits a match event
    /// the first time a delta is reconstructed and its orders cross.
    pub fn submit_delta_fragment(&self, fragment: DeltaFragment) -> Result<Option<Delta>> {
        let id = fragment.id;
        let reconstruction = self.builder.insert(fragment).map_err(|e| {
            warn!(
                "delta fragment rejected epoch={} id={} error={}",
                self.config.epoch, id, e
            );
            e
        })?;
        if let Reconstruction::Reconstructed(delta) = &reconstruction {
            let is_match = delta.is_match(&self.config.prime);
            info!(
                "delta reconstructed epoch={} delta_id={} buy_order={} sell_order={} is_match={}",
                self.config.epoch, delta.id, delta.buy_order_id, delta.sell_order_id, is_match
            );
            if is_match {
                self.sink.emit(&MatchEvent::now(self.config.epoch, delta));
            }
        }
        Ok(reconstruction.into_delta())
    }

    pub fn delta(&self, id: &DeltaId) -> Option<Delta> {
        self.builder.delta(id)
    }

    pub fn matrix(&self) -> &DeltaFragmentMatrix {
        &self.matrix
    }

    pub fn builder(&self) -> &DeltaBuilder {
        &self.builder
    }
}
