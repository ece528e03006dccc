// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit entry model.
//!
//! [`AuditEvent`] is the caller-supplied draft; it deliberately carries no
//! timestamp, because the recorder assigns one server-side at write time.
//! [`AuditEntry`] is the persisted, write-once form, and [`AuditRecord`] is
//! an entry together with its store-generated id, as returned by queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use vigil_core::AccessError;

/// Source tag recorded when the calling surface did not identify itself.
pub const DEFAULT_SOURCE: &str = "unknown";

/// The kind of state change an audit entry records.
///
/// `Read` is a legal value reserved for future read-auditing paths; no
/// path here emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Read,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Create => write!(f, "create"),
            AuditAction::Update => write!(f, "update"),
            AuditAction::Delete => write!(f, "delete"),
            AuditAction::Read => write!(f, "read"),
        }
    }
}

impl FromStr for AuditAction {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "read" => Ok(AuditAction::Read),
            other => Err(AccessError::InvalidArgument(format!(
                "unknown audit action: '{other}'"
            ))),
        }
    }
}

/// Caller-supplied draft of an audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Affected collection/domain, e.g. "clients", "users", "attachments".
    pub entity_type: String,
    /// Affected record id.
    pub entity_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Who performed the action. `None` for system-initiated actions.
    pub actor_id: Option<String>,
    /// Attribution address of the actor, if known.
    pub actor_email: Option<String>,
    /// State before the change. Populated for update/delete.
    pub before_state: Option<Value>,
    /// State after the change. Populated for create/update.
    pub after_state: Option<Value>,
    /// Free-form auxiliary context, e.g. the storage path of a deleted file.
    pub metadata: Option<Value>,
    /// Calling surface, e.g. "web". Defaults to "unknown" when unset.
    pub source: Option<String>,
    /// Human-readable summary.
    pub details: Option<String>,
}

impl AuditEvent {
    /// Start a draft for one state-changing action.
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        action: AuditAction,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action,
            actor_id: None,
            actor_email: None,
            before_state: None,
            after_state: None,
            metadata: None,
            source: None,
            details: None,
        }
    }

    /// Attribute the action to an actor.
    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Attach the actor's email for display.
    pub fn with_actor_email(mut self, email: impl Into<String>) -> Self {
        self.actor_email = Some(email.into());
        self
    }

    /// Attach the pre-change state.
    pub fn with_before(mut self, state: Value) -> Self {
        self.before_state = Some(state);
        self
    }

    /// Attach the post-change state.
    pub fn with_after(mut self, state: Value) -> Self {
        self.after_state = Some(state);
        self
    }

    /// Attach auxiliary context.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Identify the calling surface.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach a human-readable summary.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// A persisted audit entry. Write-once: the store exposes no update, and
/// the only delete is the age-based retention sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entity_type: String,
    pub entity_id: String,
    pub action: AuditAction,
    pub actor_id: Option<String>,
    pub actor_email: Option<String>,
    /// Assigned by the recorder at write time, never by the caller.
    pub timestamp: DateTime<Utc>,
    pub before_state: Option<Value>,
    pub after_state: Option<Value>,
    pub metadata: Option<Value>,
    pub source: String,
    pub details: Option<String>,
}

/// An audit entry with its store-generated id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    #[serde(flatten)]
    pub entry: AuditEntry,
}
