//! Health check handler.

use crate::models::StatusResponse;
use axum::Json;
use tracing::instrument;

/// Handler for GET /
///
/// Liveness check. Returns a fixed status message; no dependencies are
/// probed, so this answers as long as the process is serving requests.
///
/// ## Example Response
///
/// ```json
/// {
///   "message": "\u{2705} Nova Relay backend is running."
/// }
/// ```
#[instrument(skip_all, name = "relay.handlers.home")]
pub async fn home() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "\u{2705} Nova Relay backend is running.".to_string(),
    })
}

/// Handler for GET /health
///
/// Machine-readable variant of the liveness check for probes.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "healthy"
/// }
/// ```
#[instrument(skip_all, name = "relay.handlers.health")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Response for GET /health.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests.
    pub status: String,
}
