// SPDX-License-Identifier: PMPL-1.0-or-later
//! Role tags and the ranked role set behind every permission decision.
//!
//! The three tags form a strict total order, `operator < admin < superuser`.
//! The order lives in one place (the `Ord` derive on [`Role`]) so the
//! "is at least" predicates cannot drift apart.

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A ranked role tag.
///
/// Variant order is significant: the derived `Ord` is the role hierarchy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Day-to-day operations on business records.
    Operator,
    /// Operator authority plus management of operator accounts.
    Admin,
    /// Full authority, including management of admins and superusers.
    SuperUser,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Operator => write!(f, "operator"),
            Role::Admin => write!(f, "admin"),
            Role::SuperUser => write!(f, "superuser"),
        }
    }
}

impl FromStr for Role {
    type Err = AccessError;

    /// Parse a role tag, case-insensitively, ignoring surrounding blanks.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "operator" => Ok(Role::Operator),
            "admin" => Ok(Role::Admin),
            "superuser" => Ok(Role::SuperUser),
            other => Err(AccessError::InvalidArgument(format!(
                "unknown role tag: '{other}'"
            ))),
        }
    }
}

/// An ordered, deduplicated set of role tags.
///
/// Order is preserved only so [`RoleSet::primary`] can report the first
/// tag for display; permission checks are membership tests and ignore
/// position entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    /// The empty set. Satisfies no level.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Collapse the stored role field into a canonical set.
    ///
    /// The profile store tolerates a role attribute that is sometimes a
    /// bare string and sometimes a list; this is the single place that
    /// branches on the shape. Non-string, blank, and unrecognized entries
    /// are discarded. Absent/null input normalizes to the empty set.
    pub fn normalize(raw: &Value) -> Self {
        match raw {
            Value::Null => Self::new(),
            Value::String(tag) => Self::from_tags([tag.as_str()]),
            Value::Array(items) => Self::from_tags(items.iter().filter_map(|item| {
                match item {
                    Value::String(tag) => Some(tag.as_str()),
                    other => {
                        debug!(entry = %other, "discarding non-string role entry");
                        None
                    }
                }
            })),
            other => {
                debug!(value = %other, "role field is neither string nor array");
                Self::new()
            }
        }
    }

    /// Build a set from string tags, dropping anything that does not parse.
    fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = Self::new();
        for tag in tags {
            if tag.trim().is_empty() {
                continue;
            }
            match tag.parse::<Role>() {
                Ok(role) => set.push(role),
                Err(_) => debug!(tag, "discarding unrecognized role tag"),
            }
        }
        set
    }

    fn push(&mut self, role: Role) {
        if !self.0.contains(&role) {
            self.0.push(role);
        }
    }

    /// True iff the set contains `level` or any tag that outranks it.
    pub fn satisfies(&self, level: Role) -> bool {
        self.0.iter().any(|role| *role >= level)
    }

    /// Satisfied by operator, admin, or superuser membership.
    pub fn is_operator(&self) -> bool {
        self.satisfies(Role::Operator)
    }

    /// Satisfied by admin or superuser membership.
    pub fn is_admin(&self) -> bool {
        self.satisfies(Role::Admin)
    }

    /// Satisfied by superuser membership only.
    pub fn is_superuser(&self) -> bool {
        self.satisfies(Role::SuperUser)
    }

    /// First tag in stored order, for display. Not authoritative.
    pub fn primary(&self) -> Option<Role> {
        self.0.first().copied()
    }

    /// Membership test for a single tag.
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no tags at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate tags in stored order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self(vec![role])
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::new();
        for role in iter {
            set.push(role);
        }
        set
    }
}
