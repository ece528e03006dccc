// SPDX-License-Identifier: PMPL-1.0-or-later
//! The authenticated caller of a gated operation.

use serde::{Deserialize, Serialize};

/// Identity attached to a request by the identity provider.
///
/// `subject_id` is an opaque identifier and is never interpreted by the
/// core. `email` exists for display and audit attribution only; it plays
/// no part in permission decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque unique identifier issued by the identity provider.
    pub subject_id: String,
    /// Display/attribution address, if the provider supplied one.
    pub email: Option<String>,
}

impl Principal {
    /// Create a principal without an email.
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: None,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
