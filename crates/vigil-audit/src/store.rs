// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit store collaborator.
//!
//! An append-only collection: insert-with-generated-id, AND-filtered
//! retrieval sorted newest-first, and batched delete of entries older than
//! a cutoff. No update path exists by design.

use crate::entry::{AuditEntry, AuditRecord};
use crate::query::AuditFilter;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;
use vigil_core::AccessError;

/// Async storage interface for audit entries.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// Tokio tasks. Store failures surface as [`AccessError::Internal`].
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Persist one entry and return its generated id.
    async fn insert(&self, entry: AuditEntry) -> Result<String, AccessError>;

    /// Entries matching the filter, newest first, capped at the filter's
    /// effective limit.
    async fn find(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AccessError>;

    /// Delete entries with `timestamp < cutoff` in batches of at most
    /// `batch_size`. Returns the number deleted.
    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: usize,
    ) -> Result<usize, AccessError>;
}

/// In-memory audit store.
///
/// Reference implementation for development, tests, and single-node use.
/// All data is lost on process exit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditStore {
    entries: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    #[instrument(skip(self, entry), fields(entity_type = %entry.entity_type, action = %entry.action))]
    async fn insert(&self, entry: AuditEntry) -> Result<String, AccessError> {
        let id = Uuid::new_v4().to_string();
        let mut entries = self.entries.write().await;
        entries.push(AuditRecord {
            id: id.clone(),
            entry,
        });
        debug!(id = %id, total = entries.len(), "audit entry persisted");
        Ok(id)
    }

    async fn find(&self, filter: &AuditFilter) -> Result<Vec<AuditRecord>, AccessError> {
        let entries = self.entries.read().await;
        let mut matched: Vec<AuditRecord> = entries
            .iter()
            .filter(|record| filter.matches(&record.entry))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.entry.timestamp.cmp(&a.entry.timestamp));
        matched.truncate(filter.effective_limit());
        Ok(matched)
    }

    #[instrument(skip(self))]
    async fn delete_older_than(
        &self,
        cutoff: DateTime<Utc>,
        batch_size: usize,
    ) -> Result<usize, AccessError> {
        let batch_size = batch_size.max(1);
        let mut deleted = 0;

        // One write lock per batch so concurrent writers interleave between
        // batches. An entry written mid-sweep that is already older than
        // the cutoff is picked up by the next batch or the next sweep.
        loop {
            let mut entries = self.entries.write().await;
            let mut removed_this_batch = 0;
            entries.retain(|record| {
                if removed_this_batch < batch_size && record.entry.timestamp < cutoff {
                    removed_this_batch += 1;
                    false
                } else {
                    true
                }
            });
            drop(entries);

            deleted += removed_this_batch;
            if removed_this_batch < batch_size {
                break;
            }
        }

        debug!(deleted, "retention delete finished");
        Ok(deleted)
    }
}
