//! Role and permission model.
//!
//! Two parallel mechanisms, deliberately not composed:
//! - Role gate: coarse route protection by role membership (see
//!   `crate::auth::middleware`)
//! - Permission statement: fine-grained resource/action checks available
//!   to handlers via [`Role::has_permission`]

pub mod builtin;
pub mod role;
pub mod statement;

pub use builtin::RoleSet;
pub use role::{InvalidRole, Role, RoleName};
pub use statement::{AccessControlError, Action, Resource, Statement};
