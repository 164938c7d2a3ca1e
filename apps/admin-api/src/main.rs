//! # Meridian Admin API
//!
//! HTTP server entry point.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Admin API Server                                 │
//! │                                                                         │
//! │  Admin frontend ───► HTTP (8000) ───► Routes ───► SQLite               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup: `.env` → configuration → tracing → database + migrations →
//! superuser bootstrap → serve until Ctrl+C / SIGTERM.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use meridian_api::bootstrap::ensure_superuser;
use meridian_api::{router, ApiConfig, AppState};
use meridian_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,meridian_api=debug")),
        )
        .with_target(true)
        .init();

    info!("Starting Meridian admin API...");

    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        addr = %config.bind_addr,
        api_prefix = %config.api_v1_str,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::from_url(&config.database_url).max_connections(config.database_max_connections),
    )
    .await
    .context("opening database")?;
    info!("Database ready");

    ensure_superuser(&db, &config)
        .await
        .context("creating the first superuser")?;

    let addr = config.bind_addr;
    let state = AppState::new(db.clone(), config);
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Admin API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
