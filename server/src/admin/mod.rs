//! Admin Module
//!
//! Admin-only endpoints for console management:
//! - User listing, creation, update, deletion
//! - Role assignment
//! - Ban / unban
//! - Console statistics

pub mod handlers;
pub mod types;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::api::AppState;
use crate::auth::require_admin;

pub use types::AdminError;

/// Create the admin router.
///
/// Every route requires the admin role, applied via middleware.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::get_admin_stats))
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/users/{id}/role", patch(handlers::update_user_role))
        .route("/users/{id}/ban", post(handlers::ban_user))
        .route("/users/{id}/unban", post(handlers::unban_user))
        .layer(from_fn_with_state(state, require_admin))
}
