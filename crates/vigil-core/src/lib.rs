// SPDX-License-Identifier: PMPL-1.0-or-later
//! Vigil Core
//!
//! Shared vocabulary for the authorization and audit core:
//!
//! - **Principal**: the authenticated caller of an operation.
//! - **Role** / **RoleSet**: the ranked role tags and the membership rules
//!   every permission decision is derived from.
//! - **AccessError**: the single error taxonomy crossing component
//!   boundaries.

pub mod error;
pub mod principal;
pub mod role;

pub use error::AccessError;
pub use principal::Principal;
pub use role::{Role, RoleSet};
