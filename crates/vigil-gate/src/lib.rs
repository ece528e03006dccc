// SPDX-License-Identifier: PMPL-1.0-or-later
//! Vigil Permission Gate
//!
//! Every mutating or administrative operation passes through here before it
//! touches a business record:
//!
//! - **RoleLookup** trait: a fresh read of a principal's stored role tags,
//!   keyed by subject id. Never cached, so a role change takes effect on
//!   the very next call.
//! - **PermissionGate**: `require_authenticated` plus the ranked
//!   `require_operator` / `require_admin` / `require_superuser` checks.
//! - Pure authority helpers [`can_manage_user`] and
//!   [`can_create_user_with_role`] for user-management call sites.
//!
//! The gate itself performs no I/O beyond the role lookup and holds no
//! mutable state.

pub mod profile;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};
use vigil_core::{AccessError, Principal, Role, RoleSet};

pub use profile::{InMemoryProfileStore, Profile, ProfileStore};

/// Read of a principal's stored role tags from the profile store.
///
/// `Ok(None)` means no profile record exists for the subject. The stored
/// role field may be a bare string or a list; implementations normalize it
/// here, at the boundary, so nothing downstream branches on shape.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn roles_for(&self, subject_id: &str) -> Result<Option<RoleSet>, AccessError>;
}

/// Authentication and role checks for gated operations.
pub struct PermissionGate {
    lookup: Arc<dyn RoleLookup>,
}

impl PermissionGate {
    /// Create a gate over a role-lookup collaborator.
    pub fn new(lookup: Arc<dyn RoleLookup>) -> Self {
        Self { lookup }
    }

    /// Fail with [`AccessError::Unauthenticated`] when no principal is
    /// attached to the request. No I/O.
    pub fn require_authenticated<'a>(
        &self,
        principal: Option<&'a Principal>,
    ) -> Result<&'a Principal, AccessError> {
        principal.ok_or(AccessError::Unauthenticated)
    }

    /// Require the principal's stored role set to satisfy `level`.
    ///
    /// The lookup is performed fresh on every call. Returns the resolved
    /// primary role (`None` when the lookup found no profile) so callers
    /// can make secondary decisions without a second read.
    pub async fn require_role(
        &self,
        principal: Option<&Principal>,
        level: Role,
    ) -> Result<Option<Role>, AccessError> {
        let principal = self.require_authenticated(principal)?;
        let stored = self.lookup.roles_for(&principal.subject_id).await?;
        let roles = stored.clone().unwrap_or_default();

        if !roles.satisfies(level) {
            warn!(
                subject = %principal.subject_id,
                required = %level,
                "permission denied"
            );
            return Err(AccessError::PermissionDenied(format!(
                "requires {level} role"
            )));
        }

        debug!(
            subject = %principal.subject_id,
            required = %level,
            "role check passed"
        );
        Ok(stored.and_then(|r| r.primary()))
    }

    /// Require at least operator authority.
    pub async fn require_operator(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Option<Role>, AccessError> {
        self.require_role(principal, Role::Operator).await
    }

    /// Require at least admin authority.
    pub async fn require_admin(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Option<Role>, AccessError> {
        self.require_role(principal, Role::Admin).await
    }

    /// Require superuser authority.
    pub async fn require_superuser(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Option<Role>, AccessError> {
        self.require_role(principal, Role::SuperUser).await
    }

    /// Full normalized role set of an arbitrary subject.
    ///
    /// `Ok(None)` when no profile record exists. Used by call sites that
    /// compare authority between two principals.
    pub async fn resolve_roles(
        &self,
        subject_id: &str,
    ) -> Result<Option<RoleSet>, AccessError> {
        self.lookup.roles_for(subject_id).await
    }

    /// Primary role of an arbitrary subject, `None` when no profile exists.
    pub async fn resolve_role(&self, subject_id: &str) -> Result<Option<Role>, AccessError> {
        Ok(self
            .resolve_roles(subject_id)
            .await?
            .and_then(|r| r.primary()))
    }
}

/// Authority rule for update/delete of another principal.
///
/// A superuser may manage anyone. An admin may manage operators only.
/// Nobody else manages anybody.
pub fn can_manage_user(caller: &RoleSet, target: Role) -> bool {
    if caller.is_superuser() {
        return true;
    }
    caller.is_admin() && target == Role::Operator
}

/// Authority rule for the role assigned to a newly created principal.
/// Same rule shape as [`can_manage_user`].
pub fn can_create_user_with_role(caller: &RoleSet, new_role: Role) -> bool {
    can_manage_user(caller, new_role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn gate_with(profiles: &[(&str, serde_json::Value)]) -> PermissionGate {
        let store = InMemoryProfileStore::new();
        for (subject, roles) in profiles {
            store
                .upsert(Profile::new(*subject).with_roles(roles.clone()))
                .await
                .unwrap();
        }
        PermissionGate::new(Arc::new(store))
    }

    #[test]
    fn test_require_authenticated() {
        let gate = PermissionGate::new(Arc::new(InMemoryProfileStore::new()));
        let principal = Principal::new("u1");
        assert!(gate.require_authenticated(Some(&principal)).is_ok());
        assert!(matches!(
            gate.require_authenticated(None),
            Err(AccessError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_require_role_passes_on_membership_or_outrank() {
        let gate = gate_with(&[
            ("op", json!("operator")),
            ("adm", json!(["admin"])),
            ("root", json!("superuser")),
        ])
        .await;

        let op = Principal::new("op");
        let adm = Principal::new("adm");
        let root = Principal::new("root");

        assert_eq!(
            gate.require_operator(Some(&op)).await.unwrap(),
            Some(Role::Operator)
        );
        assert_eq!(
            gate.require_operator(Some(&adm)).await.unwrap(),
            Some(Role::Admin)
        );
        assert_eq!(
            gate.require_admin(Some(&root)).await.unwrap(),
            Some(Role::SuperUser)
        );
        assert!(gate.require_superuser(Some(&root)).await.is_ok());
    }

    #[tokio::test]
    async fn test_require_role_denies_below_level() {
        let gate = gate_with(&[("op", json!("operator"))]).await;
        let op = Principal::new("op");

        let err = gate.require_admin(Some(&op)).await.unwrap_err();
        assert!(matches!(err, AccessError::PermissionDenied(_)));
        let err = gate.require_superuser(Some(&op)).await.unwrap_err();
        assert!(matches!(err, AccessError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_require_role_denies_missing_profile_and_empty_roles() {
        let gate = gate_with(&[("blank", json!([]))]).await;

        // Profile exists but holds no role tags.
        let blank = Principal::new("blank");
        assert!(gate.require_operator(Some(&blank)).await.is_err());

        // No profile at all.
        let ghost = Principal::new("ghost");
        assert!(gate.require_operator(Some(&ghost)).await.is_err());
    }

    #[tokio::test]
    async fn test_require_role_unauthenticated_short_circuits() {
        let gate = gate_with(&[]).await;
        assert!(matches!(
            gate.require_admin(None).await,
            Err(AccessError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_resolve_role_distinguishes_missing_profile() {
        let gate = gate_with(&[("adm", json!("admin"))]).await;
        assert_eq!(gate.resolve_role("adm").await.unwrap(), Some(Role::Admin));
        assert_eq!(gate.resolve_role("ghost").await.unwrap(), None);
    }

    #[test]
    fn test_can_manage_user_truth_table() {
        let superuser = RoleSet::from(Role::SuperUser);
        let admin = RoleSet::from(Role::Admin);
        let operator = RoleSet::from(Role::Operator);
        let nobody = RoleSet::new();

        for target in [Role::Operator, Role::Admin, Role::SuperUser] {
            assert!(can_manage_user(&superuser, target));
        }

        assert!(can_manage_user(&admin, Role::Operator));
        assert!(!can_manage_user(&admin, Role::Admin));
        assert!(!can_manage_user(&admin, Role::SuperUser));

        for target in [Role::Operator, Role::Admin, Role::SuperUser] {
            assert!(!can_manage_user(&operator, target));
            assert!(!can_manage_user(&nobody, target));
        }
    }

    #[test]
    fn test_can_create_user_with_role_mirrors_manage() {
        let callers = [
            RoleSet::from(Role::SuperUser),
            RoleSet::from(Role::Admin),
            RoleSet::from(Role::Operator),
            RoleSet::new(),
        ];
        for caller in &callers {
            for target in [Role::Operator, Role::Admin, Role::SuperUser] {
                assert_eq!(
                    can_create_user_with_role(caller, target),
                    can_manage_user(caller, target)
                );
            }
        }
    }
}
