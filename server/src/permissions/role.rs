//! Role types: the named role enum persisted on users, and the grant set
//! produced by validating against the statement.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::statement::{Action, Resource};

/// Named role assigned to every user account.
///
/// Stored in Postgres as the `user_role` enum and serialized over the wire
/// as the lowercase role name. This is a closed set; there is no dynamic
/// role creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum RoleName {
    User,
    Moderator,
    Admin,
}

impl RoleName {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Returns all role names as a slice.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Moderator, Self::Admin]
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

/// Role string not in the closed set.
#[derive(Debug, Clone, Error)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub String);

/// A validated grant set: resource to the subset of its declared actions.
///
/// Roles are immutable once constructed and safe to share across requests.
#[derive(Debug, Clone)]
pub struct Role {
    grants: BTreeMap<Resource, Vec<Action>>,
}

impl Role {
    pub(crate) const fn new(grants: BTreeMap<Resource, Vec<Action>>) -> Self {
        Self { grants }
    }

    /// Pure lookup: true iff the action is granted for the resource.
    ///
    /// A resource absent from the grants is denied; there is no implicit
    /// wildcard.
    #[must_use]
    pub fn has_permission(&self, resource: Resource, action: Action) -> bool {
        self.grants
            .get(&resource)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// The full grant map, for inspection endpoints.
    #[must_use]
    pub const fn grants(&self) -> &BTreeMap<Resource, Vec<Action>> {
        &self.grants
    }
}
