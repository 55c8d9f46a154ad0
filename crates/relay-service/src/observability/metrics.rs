//! Metrics definitions for the relay service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `relay_` prefix for the relay service
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: the fixed route table (all paths are static)
//! - `status`: 3 values (success, error, timeout)
//! - `service`: bounded by the upstream clients (chat, news, weather, search)
//! - `outcome`: bounded by code (verified, invalid, unavailable)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("relay_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Upstream calls include chat completions, which can take seconds
        .set_buckets_for_metric(
            Matcher::Prefix("relay_upstream_request".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set upstream request buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `relay_http_requests_total`, `relay_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status`
///
/// This captures ALL HTTP responses including framework-level errors like:
/// - 415 Unsupported Media Type (wrong Content-Type)
/// - 400 Bad Request (JSON parse errors)
/// - 404 Not Found
/// - 405 Method Not Allowed
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    // Normalize endpoint to prevent cardinality explosion
    let normalized_endpoint = normalize_endpoint(endpoint);

    // Determine status category for simplified querying
    let status = categorize_status_code(status_code);

    histogram!("relay_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint.clone(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("relay_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to bound label cardinality
///
/// The route table is entirely static, so anything else is a probe or a
/// typo and collapses to "/other".
fn normalize_endpoint(path: &str) -> String {
    match path {
        "/" | "/health" | "/datetime" | "/me" | "/metrics" | "/chat" | "/analyze-pdf" | "/analyze-image"
        | "/search-web" | "/news/country" | "/news/topic" | "/weather" => path.to_string(),
        _ => "/other".to_string(),
    }
}

// ============================================================================
// Upstream Request Metrics
// ============================================================================

/// Record a call to an upstream API
///
/// Metric: `relay_upstream_requests_total`, `relay_upstream_request_duration_seconds`
/// Labels: `service`, `status`
///
/// Services: chat, news, weather, search, jwks
pub fn record_upstream_request(service: &str, status: &str, duration: Duration) {
    histogram!("relay_upstream_request_duration_seconds",
        "service" => service.to_string()
    )
    .record(duration.as_secs_f64());

    counter!("relay_upstream_requests_total",
        "service" => service.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Token Verification Metrics
// ============================================================================

/// Record a token verification outcome
///
/// Metric: `relay_token_verifications_total`
/// Labels: `outcome`
///
/// Outcomes: verified, invalid, unavailable, anonymous
pub fn record_token_verification(outcome: &str) {
    counter!("relay_token_verifications_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Tests
// ============================================================================
