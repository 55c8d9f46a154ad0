//! Current caller handler.
//!
//! Returns the verified identity attached by the authentication
//! middleware, making the fail-open auth outcome observable to clients.

use crate::auth::AuthIdentity;
use axum::{Extension, Json};
use serde::Serialize;
use tracing::instrument;

/// Response for the `/me` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    /// Verified subject of the caller; null for anonymous requests.
    pub user_id: Option<String>,
}

/// Handler for GET /me
///
/// Returns the caller's verified identity. Anonymous callers (no token,
/// or a token that failed verification) get `null` rather than an error.
///
/// ## Response
///
/// ```json
/// {
///   "user_id": "user_2abc123"
/// }
/// ```
#[instrument(skip_all, name = "relay.handlers.me")]
pub async fn get_me(Extension(identity): Extension<AuthIdentity>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: identity.user_id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_me_verified_identity() {
        let response = get_me(Extension(AuthIdentity::verified("user_7".to_string()))).await;
        assert_eq!(response.0.user_id.as_deref(), Some("user_7"));
    }

    #[tokio::test]
    async fn test_me_anonymous_identity() {
        let response = get_me(Extension(AuthIdentity::anonymous())).await;
        assert!(response.0.user_id.is_none());
    }

    #[test]
    fn test_me_response_serializes_null_for_anonymous() {
        let response = MeResponse { user_id: None };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"user_id":null}"#);
    }
}
