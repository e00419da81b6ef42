//! Card Fetcher - queue-backed card lookup service
//!
//! Starts the queue worker, the TTL sweeper and the HTTP API, and tears them
//! down in order on SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_fetcher::{api::create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the card fetcher service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the card service and start its queue worker
/// 4. Start background TTL cleanup task
/// 5. Serve the HTTP API until a shutdown signal arrives
/// 6. Stop the worker and the sweeper
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "card_fetcher=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting card fetcher");

    let config = Config::from_env();
    info!(
        api = %config.api_base_url,
        cache_size = config.cache_size,
        cache_ttl = config.cache_ttl,
        queue_size = config.max_queue_size,
        batch_size = config.batch_size,
        port = config.server_port,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config);
    state.service.start().await;

    let shutdown = CancellationToken::new();
    let cleanup_handle = spawn_cleanup_task(
        state.service.cache().clone(),
        Duration::from_secs(config.cleanup_interval.max(1)),
        shutdown.clone(),
    );

    let app = create_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server_host))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    shutdown.cancel();
    state.service.shutdown().await;
    cleanup_handle.await.context("cleanup task failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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
}
