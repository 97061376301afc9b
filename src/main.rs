//! Freight Forms - cached CRUD service for freight quote forms
//!
//! Binary entry point: wires configuration, the cache, the stores and the
//! HTTP router together and runs until SIGINT/SIGTERM.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use freight_forms::cache::CacheManager;
use freight_forms::{create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the Freight Forms server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache manager and form stores
/// 4. Start background expiry sweep
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "freight_forms=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Freight Forms server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_ttl={}s, check_period={}s, max_keys={:?}, max_age={}ms, port={}",
        config.cache_ttl,
        config.check_period,
        config.max_keys,
        config.max_age_ms,
        config.server_port
    );
    if config.uses_default_secret() {
        warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    let state = AppState::from_config(&config);
    info!("Cache and form stores initialized");

    let sweeper = spawn_cleanup_task(state.cache.clone(), config.check_period);
    info!("Background cache sweep started");

    let cache = state.cache.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweeper, cache))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep and
/// cancels outstanding cache retries.
async fn shutdown_signal(sweeper: JoinHandle<()>, cache: CacheManager<serde_json::Value>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    sweeper.abort();
    let pending = cache.pending_retries();
    cache.abort_retries();
    warn!(
        "Cache sweep aborted; {} pending cache retries cancelled",
        pending
    );
}
