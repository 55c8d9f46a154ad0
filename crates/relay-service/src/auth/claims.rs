//! JWT claims structure and per-request identity.
//!
//! Contains the claims extracted from verified tokens. The `sub` field is
//! redacted in Debug output to prevent exposure in logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// JWT Claims structure for verified tokens.
///
/// Only `sub` is required; the identity provider includes `exp` and `iat`
/// on session tokens, and both are validated when present. The `sub` field
/// contains user identifiers which should not be exposed in logs, so a
/// custom Debug implementation redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user identifier) - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds), if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued-at timestamp (Unix epoch seconds), if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .finish()
    }
}

/// Identity attached to every request by the authentication middleware.
///
/// `user_id` is `Some` only when the request carried a bearer token that
/// verified successfully; anonymous requests and requests with invalid
/// tokens both get `None`. Handlers never see verification errors.
#[derive(Clone)]
pub struct AuthIdentity {
    /// Verified subject of the caller, if any.
    pub user_id: Option<String>,
}

impl AuthIdentity {
    /// Identity for a request with no verified token.
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Identity for a request with a verified token.
    pub fn verified(user_id: String) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Redacts the user identifier in Debug output; logs only record presence.
impl fmt::Debug for AuthIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthIdentity")
            .field("user_id", &self.user_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = Claims {
            sub: "user_2abc123".to_string(),
            exp: Some(1234567890),
            iat: Some(1234567800),
        };

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("user_2abc123"),
            "Debug output should not contain actual sub value"
        );
        assert!(
            debug_str.contains("[REDACTED]"),
            "Debug output should contain [REDACTED]"
        );
    }

    #[test]
    fn test_claims_deserializes_without_exp_or_iat() {
        let claims: Claims = serde_json::from_str(r#"{"sub":"user_1"}"#).unwrap();

        assert_eq!(claims.sub, "user_1");
        assert!(claims.exp.is_none());
        assert!(claims.iat.is_none());
    }

    #[test]
    fn test_claims_deserialization_requires_sub() {
        let result = serde_json::from_str::<Claims>(r#"{"exp":1234567890}"#);
        assert!(result.is_err(), "Claims without sub should fail to parse");
    }

    #[test]
    fn test_claims_serialization_roundtrip() {
        let claims = Claims {
            sub: "user123".to_string(),
            exp: Some(1234567890),
            iat: Some(1234567800),
        };

        let json = serde_json::to_string(&claims).unwrap();
        let deserialized: Claims = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.sub, claims.sub);
        assert_eq!(deserialized.exp, claims.exp);
        assert_eq!(deserialized.iat, claims.iat);
    }

    #[test]
    fn test_auth_identity_anonymous() {
        let identity = AuthIdentity::anonymous();
        assert!(identity.user_id.is_none());
    }

    #[test]
    fn test_auth_identity_verified() {
        let identity = AuthIdentity::verified("user_9".to_string());
        assert_eq!(identity.user_id.as_deref(), Some("user_9"));
    }

    #[test]
    fn test_auth_identity_debug_redacts_user_id() {
        let identity = AuthIdentity::verified("user_secret".to_string());
        let debug_str = format!("{:?}", identity);

        assert!(!debug_str.contains("user_secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
