// SPDX-License-Identifier: PMPL-1.0-or-later
//! Vigil Admin
//!
//! The gated user-administration call sites. Every mutation follows the
//! same shape: permission gate first, then the business effect, then an
//! audit entry. The gate read happens fresh on every call, so a role
//! change is honored by the very next request.

pub mod cleanup;

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use vigil_audit::{AuditAction, AuditEvent, AuditRecorder};
use vigil_core::{AccessError, Principal, Role, RoleSet};
use vigil_gate::{can_create_user_with_role, can_manage_user, PermissionGate, Profile, ProfileStore};

pub use cleanup::{delete_with_cleanup, BlobStore, CleanupOutcome, InMemoryBlobStore};

/// Entity collection tag used for user audit entries.
const USERS_ENTITY: &str = "users";
/// Calling-surface tag stamped on entries recorded here.
const SOURCE: &str = "web";

/// User provisioning, role changes, and deletion, under the authority
/// rules of the permission gate.
pub struct UserAdmin<S: ProfileStore + 'static> {
    gate: PermissionGate,
    profiles: Arc<S>,
    recorder: AuditRecorder,
}

impl<S: ProfileStore + 'static> UserAdmin<S> {
    /// Wire the service over a profile store and an audit recorder. The
    /// gate reads roles through the same store.
    pub fn new(profiles: Arc<S>, recorder: AuditRecorder) -> Self {
        let gate = PermissionGate::new(profiles.clone());
        Self {
            gate,
            profiles,
            recorder,
        }
    }

    /// The gate guarding these operations, for call sites that need
    /// additional checks.
    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    /// Provision a profile with an initial role.
    ///
    /// Requires admin authority, and the caller must be allowed to assign
    /// `role` ([`can_create_user_with_role`]). When a profile already
    /// exists for `subject_id`, replacing it is a management action on the
    /// existing principal, so the caller must also hold
    /// [`can_manage_user`] authority over the current role. Otherwise a
    /// create could demote a principal its caller may not touch.
    pub async fn create_user(
        &self,
        caller: Option<&Principal>,
        subject_id: &str,
        email: Option<&str>,
        role: Role,
    ) -> Result<(), AccessError> {
        let actor = self.gate.require_authenticated(caller)?.clone();
        self.gate.require_admin(caller).await?;
        let caller_roles = self.caller_roles(&actor).await?;

        if !can_create_user_with_role(&caller_roles, role) {
            return Err(AccessError::PermissionDenied(format!(
                "not allowed to create a user with role {role}"
            )));
        }

        if let Some(existing) = self.profiles.get(subject_id).await? {
            let existing_role = existing.role_set().primary().unwrap_or(Role::Operator);
            if !can_manage_user(&caller_roles, existing_role) {
                return Err(AccessError::PermissionDenied(format!(
                    "subject {subject_id} already exists as a {existing_role}"
                )));
            }
        }

        let mut profile = Profile::new(subject_id).with_roles(json!([role.to_string()]));
        if let Some(email) = email {
            profile = profile.with_email(email);
        }
        self.profiles.upsert(profile.clone()).await?;
        info!(subject = %subject_id, %role, "user provisioned");

        self.record_user_event(
            &actor,
            subject_id,
            AuditAction::Create,
            None,
            Some(to_state(&profile)?),
            None,
        )
        .await?;
        Ok(())
    }

    /// Replace the target's role.
    ///
    /// Requires admin authority and [`can_manage_user`] over the target's
    /// current role.
    pub async fn update_user_role(
        &self,
        caller: Option<&Principal>,
        target_id: &str,
        new_role: Role,
    ) -> Result<(), AccessError> {
        let actor = self.gate.require_authenticated(caller)?.clone();
        self.gate.require_admin(caller).await?;
        let caller_roles = self.caller_roles(&actor).await?;

        let target = self.profiles.get(target_id).await?;
        let target_role = self.target_role(&caller_roles, &target, target_id)?;
        if !can_manage_user(&caller_roles, target_role) {
            return Err(AccessError::PermissionDenied(format!(
                "not allowed to manage a {target_role}"
            )));
        }

        let before = target.as_ref().map(to_state).transpose()?;
        let mut profile = target.unwrap_or_else(|| Profile::new(target_id));
        profile.roles = json!([new_role.to_string()]);
        self.profiles.upsert(profile.clone()).await?;
        info!(subject = %target_id, role = %new_role, "user role updated");

        self.record_user_event(
            &actor,
            target_id,
            AuditAction::Update,
            before,
            Some(to_state(&profile)?),
            None,
        )
        .await?;
        Ok(())
    }

    /// Delete the target's profile. Returns whether a record existed.
    pub async fn delete_user(
        &self,
        caller: Option<&Principal>,
        target_id: &str,
    ) -> Result<bool, AccessError> {
        let (existed, _) = self.delete_user_inner(caller, target_id, None).await?;
        Ok(existed)
    }

    /// Delete the target's profile and clean up an associated stored blob,
    /// e.g. an avatar image.
    ///
    /// The profile removal is the fatal phase; the blob deletion is
    /// best-effort and its outcome is reported, never escalated. The blob
    /// path and the cleanup outcome land in the audit entry's metadata.
    pub async fn delete_user_with_cleanup(
        &self,
        caller: Option<&Principal>,
        target_id: &str,
        blobs: &dyn BlobStore,
        blob_path: &str,
    ) -> Result<(bool, CleanupOutcome), AccessError> {
        let (existed, outcome) = self
            .delete_user_inner(caller, target_id, Some((blobs, blob_path)))
            .await?;
        Ok((existed, outcome.unwrap_or(CleanupOutcome::Skipped)))
    }

    async fn delete_user_inner(
        &self,
        caller: Option<&Principal>,
        target_id: &str,
        blob: Option<(&dyn BlobStore, &str)>,
    ) -> Result<(bool, Option<CleanupOutcome>), AccessError> {
        let actor = self.gate.require_authenticated(caller)?.clone();
        self.gate.require_admin(caller).await?;
        let caller_roles = self.caller_roles(&actor).await?;

        let target = self.profiles.get(target_id).await?;
        let target_role = self.target_role(&caller_roles, &target, target_id)?;
        if !can_manage_user(&caller_roles, target_role) {
            return Err(AccessError::PermissionDenied(format!(
                "not allowed to manage a {target_role}"
            )));
        }

        let (existed, cleanup) = match blob {
            Some((blobs, path)) => {
                let (existed, outcome) =
                    delete_with_cleanup(|| self.profiles.remove(target_id), blobs, Some(path))
                        .await?;
                (existed, Some((path, outcome)))
            }
            None => (self.profiles.remove(target_id).await?, None),
        };
        info!(subject = %target_id, existed, "user deleted");

        let before = target.as_ref().map(to_state).transpose()?;
        let metadata = cleanup.as_ref().map(|(path, outcome)| {
            json!({
                "storage_path": path,
                "cleanup": outcome,
            })
        });
        self.record_user_event(&actor, target_id, AuditAction::Delete, before, None, metadata)
            .await?;
        Ok((existed, cleanup.map(|(_, outcome)| outcome)))
    }

    /// The caller's full normalized role set, read fresh.
    async fn caller_roles(&self, actor: &Principal) -> Result<RoleSet, AccessError> {
        Ok(self
            .gate
            .resolve_roles(&actor.subject_id)
            .await?
            .unwrap_or_default())
    }

    /// Effective role of the target for authority comparison.
    ///
    /// A stored profile without a recognizable tag counts as an operator:
    /// it holds no authority of its own, so operator-level authority over
    /// it suffices. A *missing* profile is privilege-dependent: a
    /// superuser caller proceeds treating the subject as an operator,
    /// which lets a superuser provision or delete a subject that has no
    /// profile record yet; every other caller gets `NotFound`.
    fn target_role(
        &self,
        caller: &RoleSet,
        target: &Option<Profile>,
        target_id: &str,
    ) -> Result<Role, AccessError> {
        match target {
            Some(profile) => Ok(profile.role_set().primary().unwrap_or(Role::Operator)),
            None if caller.is_superuser() => Ok(Role::Operator),
            None => Err(AccessError::NotFound(format!(
                "no profile for subject {target_id}"
            ))),
        }
    }

    /// Record the audit entry for a completed user mutation.
    ///
    /// Runs after the effect has committed; a failure here propagates but
    /// cannot roll the effect back.
    async fn record_user_event(
        &self,
        actor: &Principal,
        subject_id: &str,
        action: AuditAction,
        before: Option<Value>,
        after: Option<Value>,
        metadata: Option<Value>,
    ) -> Result<(), AccessError> {
        let mut event = AuditEvent::new(USERS_ENTITY, subject_id, action)
            .with_actor(&actor.subject_id)
            .with_source(SOURCE);
        if let Some(email) = &actor.email {
            event = event.with_actor_email(email);
        }
        if let Some(before) = before {
            event = event.with_before(before);
        }
        if let Some(after) = after {
            event = event.with_after(after);
        }
        if let Some(metadata) = metadata {
            event = event.with_metadata(metadata);
        }
        self.recorder.record(event).await?;
        Ok(())
    }
}

fn to_state(profile: &Profile) -> Result<Value, AccessError> {
    serde_json::to_value(profile).map_err(|e| AccessError::Internal(e.to_string()))
}
