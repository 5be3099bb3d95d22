//! ora-dash - Online Retail Analytics dashboard
//!
//! Web UI over the aggregation queries, with results cached for a
//! configurable window (default 5 minutes).

use anyhow::{Context, Result};
use clap::Parser;
use ora_common::cli::DatabaseArgs;
use ora_common::config::{load_dotenv, ConfigResolver};
use ora_common::db::{MongoStore, RecordStore};
use ora_dash::{build_router, init_tracing, AppState};
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Command-line arguments for ora-dash
#[derive(Parser, Debug)]
#[command(name = "ora-dash")]
#[command(about = "Online Retail Analytics dashboard")]
#[command(version)]
struct Args {
    #[command(flatten)]
    db: DatabaseArgs,

    /// Listen address (overrides ORA_DASH_BIND)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Result cache window in seconds, 60-3600 (overrides ORA_CACHE_TTL_SECS)
    #[arg(long, value_name = "SECS")]
    cache_ttl: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv_path = load_dotenv();
    let args = Args::parse();

    let mut overrides = args.db.overrides();
    overrides.dashboard_bind = args.bind.clone();
    overrides.cache_ttl_secs = args.cache_ttl;
    let config = ConfigResolver::new(overrides)
        .resolve()
        .context("Failed to resolve configuration")?;

    init_tracing(&config.log_level);

    info!("{}", ora_common::build_info!().banner("ORA dashboard", "ora-dash"));
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }
    info!("Database: {}", config.redacted_uri());

    let store = MongoStore::connect(&config)
        .await
        .context("Failed to connect to MongoDB")?;
    info!("Connected to {}", store.namespace());

    let state = AppState::new(Arc::new(store.clone()), config.cache_ttl_secs);
    info!("Result cache window: {}s", state.cache.ttl().as_secs());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.dashboard_bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.dashboard_bind))?;
    info!("ora-dash listening on http://{}", config.dashboard_bind);
    info!("Health check: http://{}/health", config.dashboard_bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
