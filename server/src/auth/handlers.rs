//! Authentication HTTP Handlers

use axum::{
    extract::State,
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::db;
use crate::permissions::RoleName;

use super::error::{AuthError, AuthResult};
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use super::session::{extract_token, generate_token, hash_token};

// ============================================================================
// Request / Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 512))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Safe-to-expose user payload.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: RoleName,
}

impl From<db::User> for UserResponse {
    fn from(user: db::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Login response: the session token plus its expiry.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new account.
///
/// `POST /api/auth/register`
///
/// New accounts always start with the `user` role; only an admin can
/// promote them afterwards. No session is issued, the client signs in
/// explicitly.
#[tracing::instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<Json<UserResponse>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    if db::email_exists(&state.db, &body.email).await? {
        return Err(AuthError::UserAlreadyExists);
    }

    let password_hash = hash_password(&body.password)?;
    let user = db::create_user(
        &state.db,
        &body.name,
        &body.email,
        &password_hash,
        RoleName::User,
    )
    .await?;

    tracing::info!(user_id = %user.id, "Account registered");
    Ok(Json(UserResponse::from(user)))
}

/// Login with email and password.
///
/// `POST /api/auth/login`
///
/// Issues an opaque session token, returned both in the body and as a
/// cookie. Banned accounts are rejected even with valid credentials.
#[tracing::instrument(skip(state, headers, jar, body))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AuthResult<(CookieJar, Json<LoginResponse>)> {
    let user = db::find_user_by_email(&state.db, &body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    if user.is_actively_banned(Utc::now()) {
        return Err(AuthError::AccountBanned);
    }

    let token = generate_token();
    let expires_at = Utc::now() + Duration::seconds(state.config.session_ttl_secs);

    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string());
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string);

    db::create_session(
        &state.db,
        user.id,
        &hash_token(&token),
        expires_at,
        ip_address.as_deref(),
        user_agent.as_deref(),
    )
    .await?;

    let cookie = Cookie::build((state.config.session_cookie_name.clone(), token.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.config.session_ttl_secs))
        .build();

    tracing::info!(user_id = %user.id, "Session issued");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            expires_at,
            user: UserResponse::from(user),
        }),
    ))
}

/// Revoke the presented session.
///
/// `POST /api/auth/logout`
#[tracing::instrument(skip(state, headers, jar))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AuthResult<(CookieJar, Json<LogoutResponse>)> {
    if let Some(token) = extract_token(&headers, &state.config.session_cookie_name) {
        db::delete_session(&state.db, &hash_token(&token)).await?;
    }

    let removal = Cookie::build((state.config.session_cookie_name.clone(), ""))
        .path("/")
        .build();

    Ok((jar.remove(removal), Json(LogoutResponse { success: true })))
}

/// Get the current user's profile.
///
/// `GET /api/auth/me`
#[tracing::instrument(skip(auth))]
pub async fn get_profile(auth: AuthUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: auth.id,
        name: auth.name,
        email: auth.email,
        role: auth.role,
    })
}
