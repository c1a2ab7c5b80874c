//! Atrium Server - Main Entry Point
//!
//! Self-hosted admin console backend.

use anyhow::Result;
use tracing::info;

use atrium_server::{api, config, db, permissions};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Atrium Server"
    );

    // Build the role tables before anything touches the network; a
    // miswritten grant is fatal here, not at first use.
    let roles = permissions::RoleSet::builtin()?;

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    let purged = db::purge_expired_sessions(&db_pool).await?;
    if purged > 0 {
        info!(purged, "Removed expired sessions");
    }

    // Build application state
    let state = api::AppState::new(db_pool, config.clone(), roles);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
