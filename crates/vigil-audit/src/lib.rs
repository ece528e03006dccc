// SPDX-License-Identifier: PMPL-1.0-or-later
//! Vigil Audit Trail
//!
//! Records who changed what, with sensitive fields redacted before
//! persistence, and supports filtered retrieval and age-based retention.
//!
//! # Architecture
//!
//! - **AuditEvent / AuditEntry**: caller-supplied draft vs the persisted,
//!   write-once record with a server-assigned timestamp.
//! - **Sanitizer** ([`sanitize`]): pure, recursive redaction pass applied
//!   to before/after payloads.
//! - **AuditRecorder**: validates and persists a single entry.
//! - **AuditQueryService**: by-entity, by-actor, and filtered search,
//!   newest first.
//! - **RetentionSweeper**: batched deletion of entries older than a
//!   configurable age.
//! - **AuditStore** trait: async storage interface, with
//!   [`InMemoryAuditStore`] as the reference implementation.

pub mod config;
pub mod entry;
pub mod query;
pub mod recorder;
pub mod retention;
pub mod sanitize;
pub mod store;

pub use config::RetentionConfig;
pub use entry::{AuditAction, AuditEntry, AuditEvent, AuditRecord, DEFAULT_SOURCE};
pub use query::{AuditFilter, AuditQueryService, DEFAULT_ENTITY_LIMIT, DEFAULT_SEARCH_LIMIT};
pub use recorder::AuditRecorder;
pub use retention::RetentionSweeper;
pub use sanitize::{is_sensitive_key, sanitize, REDACTED};
pub use store::{AuditStore, InMemoryAuditStore};
