// SPDX-License-Identifier: PMPL-1.0-or-later
//! Profile records and the profile-store collaborator.
//!
//! A profile is the administrative record backing a principal: subject id,
//! attribution email, and the stored role field. The role field is kept in
//! its raw wire shape (bare string or list) and normalized on read, at the
//! [`RoleLookup`] boundary.

use crate::RoleLookup;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use vigil_core::{AccessError, RoleSet};

/// A stored user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Subject id issued by the identity provider. Immutable.
    pub subject_id: String,
    /// Attribution email, if known.
    pub email: Option<String>,
    /// Raw role field as persisted: null, a bare tag, or a list of tags.
    pub roles: Value,
}

impl Profile {
    /// Create a profile with no email and no roles.
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: None,
            roles: Value::Null,
        }
    }

    /// Attach an email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the raw role field.
    pub fn with_roles(mut self, roles: Value) -> Self {
        self.roles = roles;
        self
    }

    /// The normalized role set for this profile.
    pub fn role_set(&self) -> RoleSet {
        RoleSet::normalize(&self.roles)
    }
}

/// CRUD surface of the profile store, as seen by administrative call sites.
///
/// Every implementation is also a [`RoleLookup`]; the gate reads roles
/// through that narrower view.
#[async_trait]
pub trait ProfileStore: RoleLookup {
    /// Fetch a profile by subject id.
    async fn get(&self, subject_id: &str) -> Result<Option<Profile>, AccessError>;

    /// Insert or replace a profile.
    async fn upsert(&self, profile: Profile) -> Result<(), AccessError>;

    /// Remove a profile. Returns whether a record existed.
    async fn remove(&self, subject_id: &str) -> Result<bool, AccessError>;
}

/// In-memory profile store.
///
/// Reference implementation for development and tests. All data is lost on
/// process exit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
}

impl InMemoryProfileStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub fn len(&self) -> usize {
        self.profiles.read().expect("profile store lock").len()
    }

    /// Whether the store holds no profiles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RoleLookup for InMemoryProfileStore {
    async fn roles_for(&self, subject_id: &str) -> Result<Option<RoleSet>, AccessError> {
        let profiles = self.profiles.read().expect("profile store lock");
        Ok(profiles.get(subject_id).map(Profile::role_set))
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, subject_id: &str) -> Result<Option<Profile>, AccessError> {
        let profiles = self.profiles.read().expect("profile store lock");
        Ok(profiles.get(subject_id).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<(), AccessError> {
        let mut profiles = self.profiles.write().expect("profile store lock");
        debug!(subject = %profile.subject_id, "profile upserted");
        profiles.insert(profile.subject_id.clone(), profile);
        Ok(())
    }

    async fn remove(&self, subject_id: &str) -> Result<bool, AccessError> {
        let mut profiles = self.profiles.write().expect("profile store lock");
        let existed = profiles.remove(subject_id).is_some();
        debug!(subject = %subject_id, existed, "profile removed");
        Ok(existed)
    }
}
