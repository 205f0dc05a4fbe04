//! HTTP lookup server.
//!
//! Provides three endpoints:
//! - `/GeoIPLookup` - resolves `?ip=` (or the caller's address) to a range record
//! - `/status` - JSON status with dataset and lookup counters
//! - `/metrics` - Prometheus-compatible metrics

mod error;
mod handlers;
mod json;
mod types;

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::config::LOOKUP_PATH;
use handlers::{lookup_handler, metrics_handler, status_handler};

pub use error::{ApiError, NO_IP_AVAILABLE, SEARCH_FAILED};
pub use handlers::{lookup_response, LookupParams};
pub use types::{AppState, LookupBackend, StatusResponse};

/// Routes of the lookup server
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(LOOKUP_PATH, get(lookup_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Binds `listen_addr` and serves until `shutdown` is cancelled.
pub async fn start_server(
    listen_addr: String,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind lookup server to {}: {}", listen_addr, e))?;
    let local = listener.local_addr()?;

    log::info!("Lookup server listening on http://{}/", local);
    log::info!("  - Lookup: http://{}{}?ip=8.8.8.8", local, LOOKUP_PATH);
    log::info!("  - Status: http://{}/status", local);
    log::info!("  - Metrics: http://{}/metrics", local);

    axum::serve(
        listener,
        build_router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| anyhow::anyhow!("Lookup server error: {}", e))?;

    log::info!("Lookup server stopped");
    Ok(())
}
