//! Database Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::permissions::RoleName;

/// User model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: RoleName,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub ban_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether a ban is in force at `now`.
    ///
    /// A ban with no expiry is permanent; an expired ban no longer blocks
    /// the account even if the flag was never cleared.
    #[must_use]
    pub fn is_actively_banned(&self, now: DateTime<Utc>) -> bool {
        self.banned && self.ban_expires.is_none_or(|expires| expires > now)
    }
}

/// Partial user update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<RoleName>,
    pub banned: Option<bool>,
    pub ban_reason: Option<String>,
    pub ban_expires: Option<DateTime<Utc>>,
}

/// Session model: one opaque credential scoped to one user.
///
/// Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    /// Session ID.
    pub id: Uuid,
    /// User this session belongs to.
    pub user_id: Uuid,
    /// SHA-256 hash of the session token.
    pub token_hash: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// IP address of the client (stored as string for simplicity).
    pub ip_address: Option<String>,
    /// User agent of the client.
    pub user_agent: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Aggregate user counts for the admin stats endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserStats {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_moderators: i64,
    pub total_regular_users: i64,
    /// Accounts created in the last 7 days.
    pub recent_signups: i64,
}
