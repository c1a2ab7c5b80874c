//! Built-in statement and roles.
//!
//! The grant tables are hand-authored; the statement validates them at
//! startup so a typo fails the boot instead of silently granting nothing.

use super::role::{Role, RoleName};
use super::statement::Action::{
    Ban, Create, Delete, FullAccess, Impersonate, Manage, Read, Share, Unban, Update,
};
use super::statement::{AccessControlError, Action, Resource, Statement};

/// The platform permission statement.
///
/// Every (resource, action) pair any role may ever hold is declared here.
pub fn statement() -> Result<Statement, AccessControlError> {
    Statement::define(&[
        (
            Resource::User,
            &[Create, Read, Update, Delete, Ban, Unban, Impersonate],
        ),
        (Resource::Project, &[Create, Read, Update, Delete, Share]),
        (Resource::Dashboard, &[Read, Manage]),
        (Resource::Admin, &[FullAccess]),
    ])
}

/// The three built-in roles, constructed once at startup.
///
/// Grants are strictly additive: moderator extends user, admin extends
/// moderator. The engine does not enforce this; the tests do.
#[derive(Debug, Clone)]
pub struct RoleSet {
    statement: Statement,
    user: Role,
    moderator: Role,
    admin: Role,
}

impl RoleSet {
    /// Build the statement and the three roles.
    ///
    /// Fails only on a miswritten grant table, which is a configuration
    /// error and must abort startup.
    pub fn builtin() -> Result<Self, AccessControlError> {
        let statement = statement()?;

        // Users manage their own profile and projects.
        let user = statement.new_role(&[
            (Resource::User, &[Read]),
            (Resource::Project, &[Create, Read, Update]),
            (Resource::Dashboard, &[Read]),
        ])?;

        // Moderators additionally edit profiles, delete projects, and
        // manage the dashboard.
        let moderator = statement.new_role(&[
            (Resource::User, &[Read, Update]),
            (Resource::Project, &[Create, Read, Update, Delete]),
            (Resource::Dashboard, &[Read, Manage]),
        ])?;

        // Admins hold the full statement.
        let admin = statement.new_role(&[
            (
                Resource::User,
                &[Create, Read, Update, Delete, Ban, Unban, Impersonate],
            ),
            (Resource::Project, &[Create, Read, Update, Delete, Share]),
            (Resource::Dashboard, &[Read, Manage]),
            (Resource::Admin, &[FullAccess]),
        ])?;

        Ok(Self {
            statement,
            user,
            moderator,
            admin,
        })
    }

    /// The role for a given role name.
    #[must_use]
    pub const fn get(&self, name: RoleName) -> &Role {
        match name {
            RoleName::User => &self.user,
            RoleName::Moderator => &self.moderator,
            RoleName::Admin => &self.admin,
        }
    }

    /// The statement the roles were validated against.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }
}
