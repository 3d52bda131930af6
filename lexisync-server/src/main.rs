//! lexisync server
//!
//! Serves vocabulary and reading progress to reader clients, and reconciles
//! their offline edits through the sync endpoint.
//!
//! Usage:
//!   lexisync-server --port 8000 --database lexisync.sqlite3

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lexisync_server::{build_router, AppState, Args};
use lexisync_storage::Store;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("lexisync server starting...");
    let store = Store::open(&args.database)
        .with_context(|| format!("failed to open database {}", args.database.display()))?;
    info!("Database: {}", args.database.display());

    let state = AppState::new(Arc::new(store), args.sync_config());
    let app = build_router(state);

    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    match args.max_batch_size {
        Some(max) => info!("Listening on {} (max batch size {})", listener.local_addr()?, max),
        None => info!("Listening on {}", listener.local_addr()?),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("lexisync server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
