// SPDX-License-Identifier: PMPL-1.0-or-later
//! Read paths over the audit trail.
//!
//! All retrieval is newest-first by entry timestamp. Filters are
//! AND-combined; an omitted field imposes no constraint. A `from` after
//! `to` is not an error, it simply matches nothing.

use crate::entry::{AuditAction, AuditEntry, AuditRecord};
use crate::store::AuditStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use vigil_core::AccessError;

/// Default result cap for filtered search.
pub const DEFAULT_SEARCH_LIMIT: usize = 100;
/// Default result cap for by-entity and by-actor retrieval.
pub const DEFAULT_ENTITY_LIMIT: usize = 50;

/// Conjunctive filter over persisted audit entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    /// Inclusive lower bound on the entry timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the entry timestamp.
    pub to: Option<DateTime<Utc>>,
    /// Result cap. [`DEFAULT_SEARCH_LIMIT`] when unset.
    pub limit: Option<usize>,
}

impl AuditFilter {
    /// An unconstrained filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain to one entity collection.
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Constrain to one record.
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Constrain to one action kind.
    pub fn with_action(mut self, action: AuditAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Constrain to one actor.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Lower timestamp bound (inclusive).
    pub fn with_from(mut self, from: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self
    }

    /// Upper timestamp bound (inclusive).
    pub fn with_to(mut self, to: DateTime<Utc>) -> Self {
        self.to = Some(to);
        self
    }

    /// Cap the result size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The cap a store must apply for this filter.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    /// Whether an entry satisfies every provided constraint.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(entity_type) = &self.entity_type {
            if entry.entity_type != *entity_type {
                return false;
            }
        }
        if let Some(entity_id) = &self.entity_id {
            if entry.entity_id != *entity_id {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(actor_id) = &self.actor_id {
            if entry.actor_id.as_deref() != Some(actor_id.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.timestamp > to {
                return false;
            }
        }
        true
    }
}

/// Read-only retrieval of audit entries for UI and reporting.
pub struct AuditQueryService {
    store: Arc<dyn AuditStore>,
}

impl AuditQueryService {
    /// Create a query service over an audit store.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// History of one record, newest first. Default cap 50.
    pub async fn by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AuditRecord>, AccessError> {
        let filter = AuditFilter::new()
            .with_entity_type(entity_type)
            .with_entity_id(entity_id)
            .with_limit(limit.unwrap_or(DEFAULT_ENTITY_LIMIT));
        self.store.find(&filter).await
    }

    /// Actions performed by one actor, newest first. Default cap 50.
    pub async fn by_actor(
        &self,
        actor_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AuditRecord>, AccessError> {
        let filter = AuditFilter::new()
            .with_actor(actor_id)
            .with_limit(limit.unwrap_or(DEFAULT_ENTITY_LIMIT));
        self.store.find(&filter).await
    }

    /// Filtered search, newest first. The result never exceeds the
    /// filter's limit (default 100).
    pub async fn search(&self, filter: AuditFilter) -> Result<Vec<AuditRecord>, AccessError> {
        self.store.find(&filter).await
    }
}
