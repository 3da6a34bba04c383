//! HTTP server for the command endpoint, Prometheus metrics and health.
//!
//! Runs on its own tokio task.

use crate::commands::{Invocation, Reply, WatchService};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;

/// Handler for POST /commands.
async fn command_handler(
    State(service): State<Arc<WatchService>>,
    Json(invocation): Json<Invocation>,
) -> Json<Reply> {
    Json(service.handle(invocation).await)
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(service: Arc<WatchService>) -> Router {
    Router::new()
        .route("/commands", post(command_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}

/// Run the HTTP server until it fails.
pub async fn run_http_server(addr: SocketAddr, service: Arc<WatchService>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!("Failed to bind HTTP server on {}: {}", addr, e);
        e
    })?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(service)).await?;
    Ok(())
}
