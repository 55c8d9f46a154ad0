//! Relay service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! Error messages returned to clients are intentionally generic to avoid
//! leaking internal details. Actual errors are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Relay service error type.
///
/// Maps to appropriate HTTP status codes:
/// - InvalidToken: 401 Unauthorized
/// - BadRequest: 400 Bad Request
/// - MissingApiKey, OcrUnavailable, Internal: 500 Internal Server Error
/// - Upstream: 502 Bad Gateway
/// - KeySetUnavailable: 503 Service Unavailable
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Missing API key for {0}")]
    MissingApiKey(&'static str),

    #[error("OCR engine unavailable")]
    OcrUnavailable,

    #[error("Upstream error from {service}: {reason}")]
    Upstream {
        service: &'static str,
        reason: String,
    },

    #[error("Verification key set unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl RelayError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidToken(_) => 401,
            RelayError::BadRequest(_) => 400,
            RelayError::MissingApiKey(_) | RelayError::OcrUnavailable | RelayError::Internal => {
                500
            }
            RelayError::Upstream { .. } => 502,
            RelayError::KeySetUnavailable(_) => 503,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            RelayError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            RelayError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            RelayError::MissingApiKey(service) => {
                // Log which upstream is misconfigured server-side
                tracing::error!(
                    target: "relay.config",
                    service = %service,
                    "Upstream API key not configured"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MISSING_API_KEY",
                    "Service is not configured for this operation".to_string(),
                )
            }
            RelayError::Upstream { service, reason } => {
                // Log actual upstream failure server-side, return generic message
                tracing::warn!(
                    target: "relay.upstream",
                    service = %service,
                    reason = %reason,
                    "Upstream request failed"
                );
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An upstream service request failed".to_string(),
                )
            }
            RelayError::KeySetUnavailable(reason) => {
                tracing::warn!(
                    target: "relay.auth.jwks",
                    reason = %reason,
                    "Verification key set unavailable"
                );
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "KEY_SET_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            RelayError::OcrUnavailable => {
                // A deployment problem, not a bad image; say so to the client
                tracing::error!(
                    target: "relay.extraction",
                    "OCR requested but the tesseract binary is not installed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "OCR_UNAVAILABLE",
                    "Tesseract OCR is not installed".to_string(),
                )
            }
            RelayError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"nova-relay\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}
