//! Permission statement: the closed universe of resource/action pairs.
//!
//! The statement is defined once at startup and never mutated. Roles are
//! constructed against it, so a role can never grant an action the
//! statement does not declare for that resource.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::role::Role;

/// A protected category of entities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// User accounts.
    User,
    /// User-owned projects.
    Project,
    /// The console dashboard.
    Dashboard,
    /// The admin area itself.
    Admin,
}

impl Resource {
    /// Returns the wire name of the resource.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Dashboard => "dashboard",
            Self::Admin => "admin",
        }
    }

    /// Returns all resources as a slice.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::User, Self::Project, Self::Dashboard, Self::Admin]
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "project" => Ok(Self::Project),
            "dashboard" => Ok(Self::Dashboard),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// An operation performable on a resource.
///
/// Actions are only meaningful in combination with a resource; the
/// statement decides which pairs are legal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Ban,
    Unban,
    Impersonate,
    Manage,
    Share,
    FullAccess,
}

impl Action {
    /// Returns the wire name of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Impersonate => "impersonate",
            Self::Manage => "manage",
            Self::Share => "share",
            Self::FullAccess => "full_access",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            "impersonate" => Ok(Self::Impersonate),
            "manage" => Ok(Self::Manage),
            "share" => Ok(Self::Share),
            "full_access" => Ok(Self::FullAccess),
            other => Err(UnknownName(other.to_string())),
        }
    }
}

/// Unrecognized resource or action name.
#[derive(Debug, Clone, Error)]
#[error("unknown name: {0}")]
pub struct UnknownName(pub String);

/// Errors raised while building the statement or roles.
///
/// These are configuration errors: they indicate a miswritten permission
/// table and are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessControlError {
    /// The same resource was declared twice in the statement.
    #[error("duplicate resource in statement: {0}")]
    DuplicateResource(Resource),

    /// The same action was listed twice for one resource.
    #[error("duplicate action for resource {resource}: {action}")]
    DuplicateAction { resource: Resource, action: Action },

    /// A role grants an action the statement does not declare for that
    /// resource.
    #[error("unknown permission: {resource}:{action}")]
    UnknownPermission { resource: Resource, action: Action },
}

/// The full legal universe of resource/action pairs.
#[derive(Debug, Clone)]
pub struct Statement {
    entries: BTreeMap<Resource, Vec<Action>>,
}

impl Statement {
    /// Build a statement from (resource, actions) pairs.
    ///
    /// Duplicate resources and duplicate actions within one resource are
    /// rejected rather than silently deduplicated.
    pub fn define(entries: &[(Resource, &[Action])]) -> Result<Self, AccessControlError> {
        let mut map: BTreeMap<Resource, Vec<Action>> = BTreeMap::new();

        for (resource, actions) in entries {
            if map.contains_key(resource) {
                return Err(AccessControlError::DuplicateResource(*resource));
            }

            let mut list: Vec<Action> = Vec::with_capacity(actions.len());
            for action in *actions {
                if list.contains(action) {
                    return Err(AccessControlError::DuplicateAction {
                        resource: *resource,
                        action: *action,
                    });
                }
                list.push(*action);
            }

            map.insert(*resource, list);
        }

        Ok(Self { entries: map })
    }

    /// Actions declared for a resource, in declaration order.
    #[must_use]
    pub fn actions(&self, resource: Resource) -> Option<&[Action]> {
        self.entries.get(&resource).map(Vec::as_slice)
    }

    /// Whether the statement declares the given pair at all.
    #[must_use]
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.entries
            .get(&resource)
            .is_some_and(|actions| actions.contains(&action))
    }

    /// Resources declared by the statement.
    pub fn resources(&self) -> impl Iterator<Item = Resource> + '_ {
        self.entries.keys().copied()
    }

    /// Construct a role whose grants are validated against this statement.
    ///
    /// Every granted (resource, action) pair must be declared; the first
    /// undeclared pair fails construction.
    pub fn new_role(&self, grants: &[(Resource, &[Action])]) -> Result<Role, AccessControlError> {
        let mut map: BTreeMap<Resource, Vec<Action>> = BTreeMap::new();

        for (resource, actions) in grants {
            for action in *actions {
                if !self.allows(*resource, *action) {
                    return Err(AccessControlError::UnknownPermission {
                        resource: *resource,
                        action: *action,
                    });
                }
            }
            map.insert(*resource, actions.to_vec());
        }

        Ok(Role::new(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> Statement {
        Statement::define(&[
            (Resource::User, &[Action::Read, Action::Update]),
            (Resource::Project, &[Action::Create, Action::Read]),
        ])
        .expect("statement should build")
    }

    #[test]
    fn duplicate_resource_is_rejected() {
        let result = Statement::define(&[
            (Resource::User, &[Action::Read]),
            (Resource::User, &[Action::Update]),
        ]);
        assert_eq!(
            result.unwrap_err(),
            AccessControlError::DuplicateResource(Resource::User)
        );
    }

    #[test]
    fn duplicate_action_is_rejected() {
        let result = Statement::define(&[(
            Resource::Project,
            &[Action::Read, Action::Read][..],
        )]);
        assert_eq!(
            result.unwrap_err(),
            AccessControlError::DuplicateAction {
                resource: Resource::Project,
                action: Action::Read,
            }
        );
    }

    #[test]
    fn role_grants_must_be_declared() {
        let statement = statement();
        let result = statement.new_role(&[(Resource::Project, &[Action::Delete])]);
        assert_eq!(
            result.unwrap_err(),
            AccessControlError::UnknownPermission {
                resource: Resource::Project,
                action: Action::Delete,
            }
        );
    }

    #[test]
    fn role_lookup_has_no_wildcards() {
        let statement = statement();
        let role = statement
            .new_role(&[(Resource::User, &[Action::Read])])
            .expect("role should build");

        assert!(role.has_permission(Resource::User, Action::Read));
        assert!(!role.has_permission(Resource::User, Action::Update));
        // Resource absent from the grants: always denied.
        assert!(!role.has_permission(Resource::Project, Action::Read));
    }

    #[test]
    fn names_round_trip() {
        for resource in Resource::all() {
            assert_eq!(resource.as_str().parse::<Resource>().unwrap(), *resource);
        }
        for action in [
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Ban,
            Action::Unban,
            Action::Impersonate,
            Action::Manage,
            Action::Share,
            Action::FullAccess,
        ] {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
        assert!("archive".parse::<Action>().is_err());
    }
}
