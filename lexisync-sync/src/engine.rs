//! Sync engine: runs one client batch through normalize, reconcile, apply
//! and snapshot inside a single transaction.

use lexisync_storage::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::applicator::apply_record;
use crate::error::{SyncError, SyncResult};
use crate::normalizer::{normalize, PreparedRecord, RawRecord};
use crate::reconciler::Decision;
use crate::snapshot::Snapshot;

/// Configuration for the sync engine.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Maximum records per sync call. `None` accepts any size.
    pub max_batch_size: Option<usize>,
}

/// Body of a sync call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub vocabulary: Vec<RawRecord>,
}

/// Per-batch counters, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub received: usize,
    pub created: usize,
    pub superseded: usize,
    pub kept: usize,
}

impl SyncStats {
    fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Create => self.created += 1,
            Decision::Supersede => self.superseded += 1,
            Decision::KeepStored => self.kept += 1,
        }
    }

    /// Number of records that were written.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.created + self.superseded
    }
}

/// Result of a successful sync call.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub snapshot: Snapshot,
    pub stats: SyncStats,
}

/// Reconciles client batches against a shared store.
pub struct SyncEngine {
    store: Arc<Store>,
    config: SyncConfig,
}

impl SyncEngine {
    /// Creates a new sync engine over a shared store.
    pub fn new(store: Arc<Store>, config: SyncConfig) -> Self {
        Self { store, config }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Normalizes and validates a batch without touching the store.
    ///
    /// Fails on the first record missing a required field, reporting its index.
    pub fn prepare_batch(&self, batch: &[RawRecord]) -> SyncResult<Vec<PreparedRecord>> {
        if let Some(max) = self.config.max_batch_size.filter(|&max| batch.len() > max) {
            return Err(SyncError::BatchTooLarge {
                size: batch.len(),
                max,
            });
        }

        batch
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let normalized = normalize(raw);
                let id = normalized.id.to_string();
                normalized
                    .prepare()
                    .map_err(|source| SyncError::InvalidRecord { index, id, source })
            })
            .collect()
    }

    /// Reconciles a batch against the store and returns the full resulting set.
    ///
    /// Records are applied sequentially in input order. All writes and the
    /// final snapshot read share one transaction: either the whole batch
    /// commits or none of it does.
    pub fn sync(&self, request: SyncRequest) -> SyncResult<SyncOutcome> {
        let records = self.prepare_batch(&request.vocabulary).inspect_err(|e| {
            warn!("Rejected sync batch: {}", e);
        })?;
        debug!("Reconciling batch of {} records", records.len());

        let outcome = self.store.with_transaction(|tx| {
            let mut stats = SyncStats {
                received: records.len(),
                ..SyncStats::default()
            };
            for record in &records {
                stats.record(apply_record(tx, record)?);
            }
            let snapshot = Snapshot::capture(tx)?;
            Ok::<_, SyncError>(SyncOutcome { snapshot, stats })
        })?;

        info!(
            "Synced {} records ({} created, {} superseded, {} kept); snapshot has {}",
            outcome.stats.received,
            outcome.stats.created,
            outcome.stats.superseded,
            outcome.stats.kept,
            outcome.snapshot.vocabulary.len()
        );
        Ok(outcome)
    }
}
