//! Prometheus metrics endpoint handler.
//!
//! Provides the `/metrics` endpoint for Prometheus scraping.
//!
//! # Security
//!
//! This endpoint is unauthenticated to allow Prometheus to scrape metrics.
//! No PII or secrets are exposed in metrics. Only operational data with
//! bounded cardinality labels.

use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

/// Handler for GET /metrics
///
/// Returns Prometheus-formatted metrics for scraping.
///
/// # Response
///
/// Returns 200 OK with Prometheus text format:
/// ```text
/// # HELP relay_http_requests_total Total HTTP requests
/// # TYPE relay_http_requests_total counter
/// relay_http_requests_total{method="GET",endpoint="/weather",status_code="200"} 42
/// ```
#[tracing::instrument(skip_all, name = "relay.metrics.scrape")]
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
