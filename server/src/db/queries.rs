//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::permissions::RoleName;

use super::models::{Session, User, UserChanges, UserStats};

/// Log and return a database error with context.
///
/// This helper ensures all database errors are logged with relevant context
/// before being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr) => {
        |e| {
            error!(query = $query, error = %e, "Database query failed");
            e
        }
    };
    ($query:expr, $($field:tt)+) => {
        |e| {
            error!(query = $query, $($field)+, error = %e, "Database query failed");
            e
        }
    };
}

// ============================================================================
// User Queries
// ============================================================================

/// Find user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_id", user_id = %id))
}

/// Find user by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_email", email = %email))
}

/// Check if email exists.
pub async fn email_exists(pool: &PgPool, email: &str) -> sqlx::Result<bool> {
    let result: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(result.0)
}

/// Create a new user.
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: RoleName,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_user", email = %email))
}

/// List all users, newest first.
pub async fn list_users(pool: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_users"))
}

/// Update a user's role.
///
/// Returns `None` if the user does not exist.
pub async fn update_user_role(
    pool: &PgPool,
    id: Uuid,
    role: RoleName,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(role)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_user_role", user_id = %id, role = %role))
}

/// Partially update a user.
///
/// Only fields set in `changes` are written; the rest keep their value.
/// Returns `None` if the user does not exist.
pub async fn update_user(
    pool: &PgPool,
    id: Uuid,
    changes: UserChanges,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        UPDATE users SET
            name = COALESCE($1, name),
            email = COALESCE($2, email),
            role = COALESCE($3, role),
            banned = COALESCE($4, banned),
            ban_reason = COALESCE($5, ban_reason),
            ban_expires = COALESCE($6, ban_expires),
            updated_at = NOW()
        WHERE id = $7
        RETURNING *
        ",
    )
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.role)
    .bind(changes.banned)
    .bind(changes.ban_reason)
    .bind(changes.ban_expires)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_user", user_id = %id))
}

/// Delete a user. Sessions cascade.
///
/// Returns `true` if a row was deleted.
pub async fn delete_user(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_user", user_id = %id))?;

    Ok(result.rows_affected() > 0)
}

/// Ban a user.
///
/// Returns `None` if the user does not exist.
pub async fn set_user_ban(
    pool: &PgPool,
    id: Uuid,
    reason: &str,
    expires: Option<DateTime<Utc>>,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        UPDATE users SET
            banned = TRUE,
            ban_reason = $1,
            ban_expires = $2,
            updated_at = NOW()
        WHERE id = $3
        RETURNING *
        ",
    )
    .bind(reason)
    .bind(expires)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("set_user_ban", user_id = %id))
}

/// Lift a user's ban.
///
/// Returns `None` if the user does not exist.
pub async fn clear_user_ban(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        UPDATE users SET
            banned = FALSE,
            ban_reason = NULL,
            ban_expires = NULL,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("clear_user_ban", user_id = %id))
}

/// Aggregate user counts for the stats endpoint.
pub async fn user_stats(pool: &PgPool) -> sqlx::Result<UserStats> {
    sqlx::query_as::<_, UserStats>(
        r"
        SELECT
            COUNT(*) AS total_users,
            COUNT(*) FILTER (WHERE role = 'admin') AS total_admins,
            COUNT(*) FILTER (WHERE role = 'moderator') AS total_moderators,
            COUNT(*) FILTER (WHERE role = 'user') AS total_regular_users,
            COUNT(*) FILTER (WHERE created_at >= NOW() - INTERVAL '7 days') AS recent_signups
        FROM users
        ",
    )
    .fetch_one(pool)
    .await
    .map_err(db_error!("user_stats"))
}

// ============================================================================
// Session Queries
// ============================================================================

/// Create a session for a user.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> sqlx::Result<Session> {
    sqlx::query_as::<_, Session>(
        r"
        INSERT INTO sessions (id, user_id, token_hash, expires_at, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .bind(ip_address)
    .bind(user_agent)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_session", user_id = %user_id))
}

/// Find a non-expired session by token hash.
pub async fn find_active_session(
    pool: &PgPool,
    token_hash: &str,
) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        "SELECT * FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_active_session"))
}

/// Delete a session by token hash.
///
/// Returns `true` if a row was deleted.
pub async fn delete_session(pool: &PgPool, token_hash: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await
        .map_err(db_error!("delete_session"))?;

    Ok(result.rows_affected() > 0)
}

/// Revoke all sessions of a user (ban, delete).
pub async fn delete_sessions_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_sessions_for_user", user_id = %user_id))?;

    Ok(result.rows_affected())
}

/// Remove expired sessions.
///
/// Called at startup; expired rows are otherwise only skipped, not removed.
pub async fn purge_expired_sessions(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await
        .map_err(db_error!("purge_expired_sessions"))?;

    Ok(result.rows_affected())
}
