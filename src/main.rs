//! Storefront Browsing History Service
//!
//! Records which catalog products a signed-in shopper views and serves:
//! - Recently viewed products, most recent first
//! - Per-category browsing activity
//! - Clearing one item or the whole history

mod config;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use api::{router, AppState};
use history_service::BrowsingHistoryService;
use history_store::Backends;
use telemetry::{health, init_tracing_from_env, metrics};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    let cfg = AppConfig::load()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = if cfg.database.is_memory() { "memory" } else { "postgres" },
        max_connections = cfg.database.max_connections,
        default_limit = cfg.history.default_limit,
        max_limit = cfg.history.max_limit,
        "Starting browsing history service"
    );

    let backends = Backends::open(&cfg.database)
        .await
        .context("Failed to open history store")?;
    let service = BrowsingHistoryService::new(&backends, cfg.history.clone());
    record_startup_health(&service, &cfg).await;

    let app = router(AppState::new(service, &cfg.auth_url));
    let addr = cfg.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(client) = &backends.client {
        client.pool().close().await;
    }

    let snapshot = metrics().snapshot();
    info!(
        track_requests = snapshot.track_requests,
        list_requests = snapshot.list_requests,
        views_created = snapshot.views_created,
        views_incremented = snapshot.views_incremented,
        items_cleared = snapshot.items_cleared,
        store_errors = snapshot.store_errors,
        request_latency_mean_ms = snapshot.request_latency_mean_ms,
        "Shutdown complete"
    );
    Ok(())
}

async fn record_startup_health(service: &BrowsingHistoryService, cfg: &AppConfig) {
    if service.is_healthy().await {
        health().database.set_healthy();
    } else {
        // Readiness stays false until a health probe reaches the store.
        health().database.set_unhealthy("unreachable at startup");
        error!("History store unreachable at startup");
    }

    if cfg.mock_auth() {
        warn!("Auth gateway in mock mode: user_<id> tokens are accepted");
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C handler unavailable");
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
                error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let source = tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = terminate => "sigterm",
    };
    info!(signal = source, "Shutting down");
}
