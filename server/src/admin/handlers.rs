//! Admin API handlers.
//!
//! User management and console statistics. Every route here sits behind
//! the admin role gate; handlers only deal with the work itself.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::password::hash_password;
use crate::db::{self, UserChanges, UserStats};
use crate::permissions::RoleName;

use super::types::{
    AdminError, AdminUserResponse, BanUserRequest, CreateUserRequest, SuccessResponse,
    UpdateRoleRequest, UpdateUserRequest,
};

/// Default reason recorded when an admin bans without providing one.
const DEFAULT_BAN_REASON: &str = "Banned by administrator";

fn parse_role(role: &str) -> Result<RoleName, AdminError> {
    role.parse()
        .map_err(|_| AdminError::Validation(format!("Invalid role: {role}")))
}

/// List all users, newest first.
///
/// `GET /api/admin/users`
#[tracing::instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUserResponse>>, AdminError> {
    let users = db::list_users(&state.db).await?;
    Ok(Json(users.into_iter().map(AdminUserResponse::from).collect()))
}

/// Create a user with an explicit role.
///
/// `POST /api/admin/users`
#[tracing::instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<AdminUserResponse>, AdminError> {
    if body.name.is_empty() || body.email.is_empty() || body.password.is_empty() {
        return Err(AdminError::Validation(
            "Name, email, password, and role are required".into(),
        ));
    }

    let role = parse_role(&body.role)?;

    if db::email_exists(&state.db, &body.email).await? {
        return Err(AdminError::Validation("Email already in use".into()));
    }

    let password_hash = hash_password(&body.password).map_err(|_| AdminError::PasswordHash)?;
    let user = db::create_user(&state.db, &body.name, &body.email, &password_hash, role).await?;

    tracing::info!(user_id = %user.id, role = %role, "Admin created user");
    Ok(Json(AdminUserResponse::from(user)))
}

/// Get a single user.
///
/// `GET /api/admin/users/{id}`
#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminUserResponse>, AdminError> {
    let user = db::find_user_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AdminError::NotFound("User".into()))?;

    Ok(Json(AdminUserResponse::from(user)))
}

/// Partially update a user.
///
/// `PUT /api/admin/users/{id}`
#[tracing::instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<AdminUserResponse>, AdminError> {
    let role = body.role.as_deref().map(parse_role).transpose()?;

    let changes = UserChanges {
        name: body.name,
        email: body.email,
        role,
        banned: body.banned,
        ban_reason: body.ban_reason,
        ban_expires: body.ban_expires,
    };

    let user = db::update_user(&state.db, id, changes)
        .await?
        .ok_or_else(|| AdminError::NotFound("User".into()))?;

    Ok(Json(AdminUserResponse::from(user)))
}

/// Delete a user. Their sessions go with them.
///
/// `DELETE /api/admin/users/{id}`
#[tracing::instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AdminError> {
    if !db::delete_user(&state.db, id).await? {
        return Err(AdminError::NotFound("User".into()));
    }

    tracing::info!(user_id = %id, "Admin deleted user");
    Ok(Json(SuccessResponse { success: true }))
}

/// Update a user's role.
///
/// `PATCH /api/admin/users/{id}/role`
#[tracing::instrument(skip(state, body))]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<AdminUserResponse>, AdminError> {
    let role = parse_role(&body.role)?;

    let user = db::update_user_role(&state.db, id, role)
        .await?
        .ok_or_else(|| AdminError::NotFound("User".into()))?;

    tracing::info!(user_id = %id, role = %role, "Admin changed user role");
    Ok(Json(AdminUserResponse::from(user)))
}

/// Ban a user and revoke their sessions.
///
/// `POST /api/admin/users/{id}/ban`
#[tracing::instrument(skip(state, body))]
pub async fn ban_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<BanUserRequest>, JsonRejection>,
) -> Result<Json<AdminUserResponse>, AdminError> {
    // A bare POST with no body bans with the default reason.
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let reason = body.reason.as_deref().unwrap_or(DEFAULT_BAN_REASON);

    let user = db::set_user_ban(&state.db, id, reason, body.expires_at)
        .await?
        .ok_or_else(|| AdminError::NotFound("User".into()))?;

    // A banned user keeps no live sessions.
    let revoked = db::delete_sessions_for_user(&state.db, id).await?;
    tracing::info!(user_id = %id, revoked, "Admin banned user");

    Ok(Json(AdminUserResponse::from(user)))
}

/// Lift a user's ban.
///
/// `POST /api/admin/users/{id}/unban`
#[tracing::instrument(skip(state))]
pub async fn unban_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminUserResponse>, AdminError> {
    let user = db::clear_user_ban(&state.db, id)
        .await?
        .ok_or_else(|| AdminError::NotFound("User".into()))?;

    tracing::info!(user_id = %id, "Admin unbanned user");
    Ok(Json(AdminUserResponse::from(user)))
}

/// Get console statistics.
///
/// `GET /api/admin/stats`
#[tracing::instrument(skip(state))]
pub async fn get_admin_stats(
    State(state): State<AppState>,
) -> Result<Json<UserStats>, AdminError> {
    let stats = db::user_stats(&state.db).await?;
    Ok(Json(stats))
}
