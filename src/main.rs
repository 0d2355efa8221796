//! Market Cache - cache engine with an admin HTTP surface
//!
//! Builds the process-wide cache registry, starts the expiry reaper and the
//! access tracker, and serves cache statistics and invalidation endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::Value;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_cache::api::create_router;
use market_cache::cache::CacheRegistry;
use market_cache::tasks::{spawn_reaper, AccessTracker, LogSink};
use market_cache::{AppState, Config};

/// Main entry point for the Market Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the access tracker worker
/// 4. Create the registry and register the namespace table
/// 5. Start background expiry reaper
/// 6. Serve the admin router until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Market Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: namespaces={}, reap_interval={}s, port={}, tracker_queue={}",
        config.namespaces.len(),
        config.reap_interval,
        config.server_port,
        config.tracker_queue_capacity
    );

    let (tracker, tracker_handle) =
        AccessTracker::spawn(Arc::new(LogSink), config.tracker_queue_capacity);

    let registry = CacheRegistry::<Value>::new().with_tracker(tracker);
    let state = AppState::from_config(&config, registry)
        .context("failed to register cache namespaces")?;
    info!("Cache registry initialized");

    let reaper = spawn_reaper(state.registry.clone(), config.reap_interval());
    info!("Background expiry reaper started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    reaper.stop().await;
    // The worker exits once the last registry handle is dropped
    match tokio::time::timeout(Duration::from_secs(5), tracker_handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Access tracker ended abnormally"),
        Err(_) => warn!("Access tracker did not drain before shutdown"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
