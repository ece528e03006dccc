// SPDX-License-Identifier: PMPL-1.0-or-later
//! Validating, redacting audit writer.

use crate::entry::{AuditEntry, AuditEvent, DEFAULT_SOURCE};
use crate::sanitize::sanitize;
use crate::store::AuditStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;
use vigil_core::AccessError;

/// Validates and durably records one audit entry per gated mutation.
///
/// Call sites invoke this *after* the business effect has committed, so a
/// transient write failure here cannot roll that effect back. The failure
/// still propagates to the caller rather than being swallowed; the system
/// accepts a small window of under-logged mutations instead of blocking
/// the primary operation's durability on logging durability.
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    /// Create a recorder over an audit store.
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Validate, redact, timestamp, and persist one entry.
    ///
    /// Returns the store-generated entry id.
    ///
    /// # Errors
    ///
    /// [`AccessError::InvalidArgument`] when `entity_type` or `entity_id`
    /// is blank; nothing is written in that case. Store failures propagate
    /// as [`AccessError::Internal`].
    pub async fn record(&self, event: AuditEvent) -> Result<String, AccessError> {
        if event.entity_type.trim().is_empty() {
            return Err(AccessError::InvalidArgument(
                "audit entry requires an entity_type".into(),
            ));
        }
        if event.entity_id.trim().is_empty() {
            return Err(AccessError::InvalidArgument(
                "audit entry requires an entity_id".into(),
            ));
        }

        let entry = AuditEntry {
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            action: event.action,
            actor_id: event.actor_id,
            actor_email: event.actor_email,
            // Server-assigned: a clock-skewed or compromised caller cannot
            // forge the entry time.
            timestamp: Utc::now(),
            before_state: event.before_state.as_ref().map(sanitize),
            after_state: event.after_state.as_ref().map(sanitize),
            metadata: event.metadata,
            source: event.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            details: event.details,
        };

        let id = self.store.insert(entry).await?;
        debug!(id = %id, "audit entry recorded");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditAction;
    use crate::query::AuditFilter;
    use crate::sanitize::REDACTED;
    use crate::store::InMemoryAuditStore;
    use chrono::Duration;
    use serde_json::json;

    fn recorder() -> (AuditRecorder, Arc<InMemoryAuditStore>) {
        let store = Arc::new(InMemoryAuditStore::new());
        (AuditRecorder::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_record_persists_and_returns_id() {
        let (recorder, store) = recorder();
        let id = recorder
            .record(
                AuditEvent::new("clients", "c-1", AuditAction::Create)
                    .with_actor("u-1")
                    .with_after(json!({"name": "Acme"})),
            )
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_record_rejects_blank_mandatory_fields_without_writing() {
        let (recorder, store) = recorder();

        let err = recorder
            .record(AuditEvent::new("", "c-1", AuditAction::Create))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidArgument(_)));

        let err = recorder
            .record(AuditEvent::new("clients", "   ", AuditAction::Create))
            .await
            .unwrap_err();
        assert!(matches!(err, AccessError::InvalidArgument(_)));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_redacts_before_and_after_independently() {
        let (recorder, store) = recorder();
        recorder
            .record(
                AuditEvent::new("users", "u-2", AuditAction::Update)
                    .with_before(json!({"role": "operator", "passwordHash": "a"}))
                    .with_after(json!({"role": "admin", "passwordHash": "b"})),
            )
            .await
            .unwrap();

        let found = store.find(&AuditFilter::new()).await.unwrap();
        let entry = &found[0].entry;
        assert_eq!(entry.before_state.as_ref().unwrap()["passwordHash"], json!(REDACTED));
        assert_eq!(entry.after_state.as_ref().unwrap()["passwordHash"], json!(REDACTED));
        assert_eq!(entry.before_state.as_ref().unwrap()["role"], json!("operator"));
        assert_eq!(entry.after_state.as_ref().unwrap()["role"], json!("admin"));
    }

    #[tokio::test]
    async fn test_record_leaves_absent_states_absent() {
        let (recorder, store) = recorder();
        recorder
            .record(AuditEvent::new("notes", "n-1", AuditAction::Delete))
            .await
            .unwrap();

        let found = store.find(&AuditFilter::new()).await.unwrap();
        assert!(found[0].entry.before_state.is_none());
        assert!(found[0].entry.after_state.is_none());
    }

    #[tokio::test]
    async fn test_record_assigns_server_timestamp_and_default_source() {
        let (recorder, store) = recorder();
        let before = Utc::now() - Duration::seconds(1);
        recorder
            .record(AuditEvent::new("clients", "c-1", AuditAction::Create))
            .await
            .unwrap();
        let after = Utc::now() + Duration::seconds(1);

        let found = store.find(&AuditFilter::new()).await.unwrap();
        let entry = &found[0].entry;
        assert!(entry.timestamp > before && entry.timestamp < after);
        assert_eq!(entry.source, "unknown");
    }

    #[tokio::test]
    async fn test_record_keeps_caller_source_tag() {
        let (recorder, store) = recorder();
        recorder
            .record(AuditEvent::new("clients", "c-1", AuditAction::Create).with_source("web"))
            .await
            .unwrap();
        let found = store.find(&AuditFilter::new()).await.unwrap();
        assert_eq!(found[0].entry.source, "web");
    }
}
