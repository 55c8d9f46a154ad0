//! Shared response models for the relay service.
//!
//! Endpoint-specific request/response types live next to their handlers;
//! these are the shapes several endpoints share.

use serde::{Deserialize, Serialize};

/// Status message response.
///
/// Returned by the `/` health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Human-readable status message.
    pub message: String,
}

/// Single-string payload response.
///
/// Used by endpoints whose result is one preformatted text blob the
/// frontend renders directly (`/datetime`, `/chat`, `/news/*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextResponse {
    /// Preformatted response text.
    pub response: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_response_serialization() {
        let response = StatusResponse {
            message: "running".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"message":"running"}"#);
    }

    #[test]
    fn test_text_response_serialization() {
        let response = TextResponse {
            response: "line one\nline two".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["response"], "line one\nline two");
    }
}
