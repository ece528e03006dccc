// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error taxonomy shared by the gate, the audit trail, and their call sites.

use thiserror::Error;

/// Errors surfaced by permission checks, audit writes, and store reads.
///
/// Callers surface the category and message; no retries happen inside the
/// core. Retry policy, if any, belongs to the caller.
#[derive(Error, Debug)]
pub enum AccessError {
    /// No principal is attached to the request.
    #[error("authentication required")]
    Unauthenticated,

    /// The principal lacks the required role or authority over the target.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A request or audit entry is missing or carries a malformed field.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced profile or record is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A backing-store failure.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_category() {
        assert_eq!(
            AccessError::Unauthenticated.to_string(),
            "authentication required"
        );
        assert_eq!(
            AccessError::PermissionDenied("requires admin role".into()).to_string(),
            "permission denied: requires admin role"
        );
        assert_eq!(
            AccessError::NotFound("user-9".into()).to_string(),
            "not found: user-9"
        );
    }
}
