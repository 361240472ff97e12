//! keyledger license registry server
//!
//! Serves license checks, registrations and active-license listings over
//! HTTP, backed by a SQLite database.
//!
//! Usage:
//!   keyledger-server --port 5001 --database licenses.db
//!
//! Every flag can also be set through the environment (`PORT`,
//! `DATABASE_URL`, ...) or a `.env` file. `RUST_LOG` overrides `--verbose`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use keyledger_license::LicenseService;
use keyledger_server::{AppState, Config, build_router, load_env_file};
use keyledger_types::{SharedClock, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_file(None);
    let config = Config::parse();
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    config.validate().context("Invalid configuration")?;

    info!("keyledger starting...");
    if let Some(path) = &env_file {
        info!("Loaded environment from {}", path.display());
    }
    let clock: SharedClock = Arc::new(SystemClock);
    let target = config.database_target()?;
    let store = target
        .open(Arc::clone(&clock))
        .with_context(|| format!("Failed to open license database {:?}", target))?;
    info!("License database ready ({:?})", target);

    let state = AppState::new(LicenseService::new(store, clock), config.storage_timeout());
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP port {}", addr))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("keyledger stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
