//! Authentication Middleware
//!
//! Resolves the current user from the request's session and gates routes
//! by role membership. The gate checks only the role name; fine-grained
//! permission checks live in `crate::permissions` and are consulted by
//! handlers, never by the gate.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::AppState;
use crate::db::{self, User};
use crate::permissions::RoleName;

use super::error::AuthError;
use super::session::{extract_token, hash_token};

/// Authenticated user injected into request extensions.
///
/// This is a minimal struct containing only safe-to-expose user data.
/// Use this in handlers to access the current user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Assigned role.
    pub role: RoleName,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Outcome of evaluating a gate against a request.
///
/// These are expected control flow, not errors: callers translate
/// `Unauthenticated` to 401 and `Forbidden` to 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The user may proceed to the protected handler.
    Allow,
    /// No valid session resolved from the request.
    Unauthenticated,
    /// Valid session, but the role is not in the gate's allowed set.
    Forbidden,
}

/// A reusable role gate: a fixed set of allowed roles.
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [RoleName],
}

/// Gate admitting admins only.
pub const ADMIN_ONLY: RoleGate = RoleGate::new(&[RoleName::Admin]);

/// Gate admitting moderators and admins.
pub const MODERATOR_OR_ADMIN: RoleGate =
    RoleGate::new(&[RoleName::Moderator, RoleName::Admin]);

/// Gate admitting every recognized role.
pub const ANY_ROLE: RoleGate =
    RoleGate::new(&[RoleName::User, RoleName::Moderator, RoleName::Admin]);

impl RoleGate {
    /// Create a gate over a fixed allowed-role set.
    #[must_use]
    pub const fn new(allowed: &'static [RoleName]) -> Self {
        Self { allowed }
    }

    /// Evaluate the gate for an already-resolved user.
    ///
    /// Pure: one role membership check, no I/O, same decision for the
    /// same inputs.
    #[must_use]
    pub fn evaluate(&self, user: Option<&AuthUser>) -> Decision {
        match user {
            None => Decision::Unauthenticated,
            Some(user) if self.allowed.contains(&user.role) => Decision::Allow,
            Some(_) => Decision::Forbidden,
        }
    }
}

/// Resolve the current user from request headers.
///
/// Returns `Ok(None)` when there is no token, the session is unknown or
/// expired, the backing user row is gone, or the account is actively
/// banned. A session pointing at a missing user is logged: the caller
/// sees it as a plain unauthenticated request, the log tells it apart.
/// Database failures propagate; they are backend errors, not absence.
pub async fn resolve_current_user(
    state: &AppState,
    headers: &HeaderMap,
) -> sqlx::Result<Option<AuthUser>> {
    let Some(token) = extract_token(headers, &state.config.session_cookie_name) else {
        return Ok(None);
    };

    let Some(session) = db::find_active_session(&state.db, &hash_token(&token)).await? else {
        return Ok(None);
    };

    let Some(user) = db::find_user_by_id(&state.db, session.user_id).await? else {
        tracing::warn!(
            session_id = %session.id,
            user_id = %session.user_id,
            "Session references a missing user, treating as unauthenticated"
        );
        return Ok(None);
    };

    if user.is_actively_banned(Utc::now()) {
        return Ok(None);
    }

    Ok(Some(AuthUser::from(user)))
}

/// Resolve, evaluate, and translate the decision to a response.
///
/// On `Allow` the resolved `AuthUser` is injected into request
/// extensions for downstream extractors.
async fn gate_request(
    gate: RoleGate,
    state: AppState,
    mut request: Request,
    next: Next,
) -> Response {
    let user = match resolve_current_user(&state, request.headers()).await {
        Ok(user) => user,
        Err(e) => return AuthError::Database(e).into_response(),
    };

    match gate.evaluate(user.as_ref()) {
        Decision::Allow => {
            if let Some(user) = user {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        Decision::Unauthenticated => AuthError::AuthenticationRequired.into_response(),
        Decision::Forbidden => AuthError::InsufficientRole.into_response(),
    }
}

/// Middleware that requires the admin role.
///
/// # Usage
///
/// Apply to routes that are admin-only:
/// ```ignore
/// Router::new()
///     .route("/stats", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_admin))
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate_request(ADMIN_ONLY, state, request, next).await
}

/// Middleware that requires the moderator or admin role.
pub async fn require_moderator_or_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate_request(MODERATOR_OR_ADMIN, state, request, next).await
}

/// Middleware that requires any authenticated role.
pub async fn require_user(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    gate_request(ANY_ROLE, state, request, next).await
}

/// Extractor for authenticated user in handlers.
///
/// Use this to get the current user in protected endpoints:
///
/// ```ignore
/// async fn protected_handler(auth_user: AuthUser) -> impl IntoResponse {
///     format!("Hello, {}!", auth_user.name)
/// }
/// ```
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::AuthenticationRequired)
    }
}
