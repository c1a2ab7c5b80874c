//! API Router and Application State
//!
//! Central routing configuration and shared state.

pub mod me;


use axum::{middleware::from_fn_with_state, routing::get, routing::post, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{admin, auth, config::Config, permissions::RoleSet};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
    /// Built-in role set, constructed and validated once at startup
    pub roles: Arc<RoleSet>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config, roles: RoleSet) -> Self {
        Self {
            db,
            config: Arc::new(config),
            roles: Arc::new(roles),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Permission inspection for the calling user (any authenticated role)
    let me_routes = Router::new()
        .route("/", get(me::my_permissions))
        .route("/check", post(me::check_permission))
        .layer(from_fn_with_state(state.clone(), auth::require_user));

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/admin", admin::router(state.clone()))
        .nest("/api/me/permissions", me_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
