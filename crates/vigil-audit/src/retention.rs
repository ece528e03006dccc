// SPDX-License-Identifier: PMPL-1.0-or-later
//! Bounded-age cleanup of audit history.

use crate::config::RetentionConfig;
use crate::store::AuditStore;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;
use vigil_core::AccessError;

/// Deletes audit entries older than a configurable age, in batches.
///
/// The sweeper has no schedule awareness; an external scheduler invokes
/// it. It may run concurrently with ordinary writes: an entry written
/// mid-sweep that is already older than the cutoff (clock skew) is a
/// legitimate candidate for immediate deletion.
pub struct RetentionSweeper {
    store: Arc<dyn AuditStore>,
    config: RetentionConfig,
}

impl RetentionSweeper {
    /// Create a sweeper over an audit store.
    pub fn new(store: Arc<dyn AuditStore>, config: RetentionConfig) -> Self {
        Self { store, config }
    }

    /// Delete entries older than `days_to_keep` days. Returns the number
    /// deleted; 0 when nothing matched, so back-to-back runs with no new
    /// writes are idempotent.
    pub async fn purge_older_than(&self, days_to_keep: i64) -> Result<usize, AccessError> {
        let cutoff = Utc::now() - Duration::days(days_to_keep);
        let deleted = self
            .store
            .delete_older_than(cutoff, self.config.batch_size)
            .await?;
        info!(days_to_keep, deleted, "retention sweep finished");
        Ok(deleted)
    }

    /// Sweep using the configured `days_to_keep`.
    pub async fn sweep(&self) -> Result<usize, AccessError> {
        self.purge_older_than(i64::from(self.config.days_to_keep))
            .await
    }
}
