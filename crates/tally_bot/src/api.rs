//! HTTP API exposing bot status.

use crate::BotStatus;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, instrument};

/// API state containing the status collector.
#[derive(Clone)]
pub struct ApiState {
    status: BotStatus,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(status: BotStatus) -> Self {
        Self { status }
    }
}

/// Creates the status API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .with_state(state)
}

/// Serve the router on `listener` until `shutdown` turns true.
///
/// # Errors
///
/// Returns error if the server fails while accepting connections.
#[instrument(skip_all)]
pub async fn serve(
    listener: TcpListener,
    state: ApiState,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Status API listening");
    }
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Current status snapshot.
async fn get_status(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.status.snapshot()))
}
