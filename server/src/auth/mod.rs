//! Authentication Service
//!
//! Email/password accounts, database-backed opaque sessions, and the
//! role gate middleware that protects the rest of the API.

mod error;
mod handlers;
pub mod middleware;
pub(crate) mod password;
pub mod session;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use middleware::{
    require_admin, require_moderator_or_admin, require_user, resolve_current_user, AuthUser,
    Decision, RoleGate, ADMIN_ONLY, ANY_ROLE, MODERATOR_OR_ADMIN,
};

/// Create authentication router.
///
/// Public routes (no auth required):
/// - POST /register - Register a new account
/// - POST /login - Login with email/password
///
/// Protected routes (any authenticated role):
/// - POST /logout - Revoke the presented session
/// - GET /me - Get current user profile
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let protected_routes = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_profile))
        .layer(axum_middleware::from_fn_with_state(state, require_user));

    public_routes.merge(protected_routes)
}
