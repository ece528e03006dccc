// SPDX-License-Identifier: PMPL-1.0-or-later
//! Retrieval-path tests over a seeded audit store.

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use vigil_audit::{
    AuditAction, AuditEntry, AuditFilter, AuditQueryService, AuditStore, InMemoryAuditStore,
};

fn entry(
    entity_type: &str,
    entity_id: &str,
    action: AuditAction,
    actor: &str,
    minutes_ago: i64,
) -> AuditEntry {
    AuditEntry {
        entity_type: entity_type.into(),
        entity_id: entity_id.into(),
        action,
        actor_id: Some(actor.into()),
        actor_email: None,
        timestamp: Utc::now() - Duration::minutes(minutes_ago),
        before_state: None,
        after_state: Some(json!({"minutes_ago": minutes_ago})),
        metadata: None,
        source: "web".into(),
        details: None,
    }
}

async fn seeded_store() -> Arc<InMemoryAuditStore> {
    let store = Arc::new(InMemoryAuditStore::new());
    // Five client updates at distinct ages...
    for (id, age) in [("c-1", 50), ("c-1", 40), ("c-2", 30), ("c-2", 20), ("c-3", 10)] {
        store
            .insert(entry("clients", id, AuditAction::Update, "alice", age))
            .await
            .unwrap();
    }
    // ...and three entries that match neither the type+action search below
    // nor the c-1 entity history.
    store
        .insert(entry("clients", "c-9", AuditAction::Delete, "bob", 5))
        .await
        .unwrap();
    store
        .insert(entry("users", "u-1", AuditAction::Update, "bob", 4))
        .await
        .unwrap();
    store
        .insert(entry("attachments", "a-1", AuditAction::Create, "alice", 3))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_search_applies_all_filters_and_the_cap() {
    let queries = AuditQueryService::new(seeded_store().await);

    let found = queries
        .search(
            AuditFilter::new()
                .with_entity_type("clients")
                .with_action(AuditAction::Update)
                .with_limit(2),
        )
        .await
        .unwrap();

    // Five entries match both filters; the cap keeps the two newest.
    assert_eq!(found.len(), 2);
    for record in &found {
        assert_eq!(record.entry.entity_type, "clients");
        assert_eq!(record.entry.action, AuditAction::Update);
    }
    assert!(found[0].entry.timestamp >= found[1].entry.timestamp);
    assert_eq!(found[0].entry.entity_id, "c-3");
    assert_eq!(found[1].entry.entity_id, "c-2");
}

#[tokio::test]
async fn test_by_entity_returns_one_record_history_newest_first() {
    let queries = AuditQueryService::new(seeded_store().await);

    let found = queries.by_entity("clients", "c-1", None).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|r| r.entry.entity_id == "c-1"));
    assert!(found[0].entry.timestamp >= found[1].entry.timestamp);
}

#[tokio::test]
async fn test_by_actor_spans_entity_types() {
    let queries = AuditQueryService::new(seeded_store().await);

    let found = queries.by_actor("alice", None).await.unwrap();
    assert_eq!(found.len(), 6);
    assert!(found
        .iter()
        .all(|r| r.entry.actor_id.as_deref() == Some("alice")));
    assert!(found
        .windows(2)
        .all(|w| w[0].entry.timestamp >= w[1].entry.timestamp));
}

#[tokio::test]
async fn test_time_window_search() {
    let queries = AuditQueryService::new(seeded_store().await);

    let from = Utc::now() - Duration::minutes(35);
    let to = Utc::now() - Duration::minutes(15);
    let found = queries
        .search(AuditFilter::new().with_from(from).with_to(to))
        .await
        .unwrap();

    // Only the 30- and 20-minute-old entries fall inside the window.
    assert_eq!(found.len(), 2);
    assert!(found
        .iter()
        .all(|r| r.entry.timestamp >= from && r.entry.timestamp <= to));
}

#[tokio::test]
async fn test_inverted_window_degrades_to_empty() {
    let queries = AuditQueryService::new(seeded_store().await);

    let found = queries
        .search(
            AuditFilter::new()
                .with_from(Utc::now())
                .with_to(Utc::now() - Duration::hours(1)),
        )
        .await
        .unwrap();
    assert!(found.is_empty());
}
