// SPDX-License-Identifier: PMPL-1.0-or-later
//! Two-phase delete with best-effort blob cleanup.
//!
//! Deleting an attachment removes its metadata record first (fatal on
//! failure), then its stored blob (non-fatal). The second phase's outcome
//! is reported to the caller for inspection or logging but never turns a
//! committed primary delete into a failure.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use vigil_core::AccessError;

/// Outcome of the non-fatal cleanup phase. Serializes to a snake_case tag
/// so it can be stored in audit entry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// The blob was deleted.
    Removed,
    /// There was no blob to delete.
    Skipped,
    /// Deletion failed; the primary effect stands.
    Failed(String),
}

/// File-blob storage collaborator. Only deletion is part of this core.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Delete the blob at `path`. Deleting a missing blob is an error the
    /// cleanup phase downgrades to [`CleanupOutcome::Failed`].
    async fn delete(&self, path: &str) -> Result<(), AccessError>;
}

/// Run the fatal primary phase, then best-effort blob cleanup.
///
/// The primary error propagates unchanged and skips cleanup entirely. A
/// cleanup failure is logged and reported in the returned outcome only.
pub async fn delete_with_cleanup<T, F, Fut>(
    primary: F,
    blobs: &dyn BlobStore,
    blob_path: Option<&str>,
) -> Result<(T, CleanupOutcome), AccessError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AccessError>>,
{
    let value = primary().await?;

    let outcome = match blob_path {
        None => CleanupOutcome::Skipped,
        Some(path) => match blobs.delete(path).await {
            Ok(()) => {
                debug!(path, "blob removed");
                CleanupOutcome::Removed
            }
            Err(e) => {
                warn!(path, error = %e, "blob cleanup failed; record already deleted");
                CleanupOutcome::Failed(e.to_string())
            }
        },
    };

    Ok((value, outcome))
}

/// In-memory blob store keyed by path. For development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    paths: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob at `path`.
    pub fn put(&self, path: impl Into<String>) {
        self.paths.write().expect("blob store lock").insert(path.into());
    }

    /// Whether a blob exists at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.read().expect("blob store lock").contains(path)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn delete(&self, path: &str) -> Result<(), AccessError> {
        let mut paths = self.paths.write().expect("blob store lock");
        if paths.remove(path) {
            Ok(())
        } else {
            Err(AccessError::NotFound(format!("no blob at {path}")))
        }
    }
}
