//! JWT utilities shared across Nova Relay components.
//!
//! This module provides the pieces of token handling that do not require a
//! key: a size limit for denial-of-service prevention and extraction of the
//! `kid` header used to select a verification key from a JWKS.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - This module never validates signatures; callers must verify the token
//!   against a trusted key after looking it up by `kid`

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use thiserror::Error;

/// Maximum allowed JWT size in bytes (8KB).
///
/// Typical session tokens are well under 1KB; anything larger is rejected
/// before base64 decoding or signature verification runs.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

/// Errors that can occur while inspecting a token header.
///
/// Messages are intentionally generic to prevent information leakage;
/// details are logged at debug level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token is missing required `kid` header.
    #[error("The access token is invalid or expired")]
    MissingKid,
}

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// Used to look up the correct public key in a JWKS before verification.
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong segment count, bad base64, or invalid JSON
/// - `MissingKid` - header has no `kid`, or `kid` is not a non-empty string
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    // The size gate runs before anything is decoded
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            size = token.len(),
            limit = MAX_JWT_SIZE_BYTES,
            "Oversized token refused before decoding"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    // Exactly three dot-separated segments; only the header is inspected
    let mut segments = token.split('.');
    let (Some(header_part), Some(_payload), Some(_signature), None) = (
        segments.next().filter(|s| !s.is_empty()),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        tracing::debug!(
            target: "common.jwt",
            "Token lacks the header.payload.signature shape"
        );
        return Err(JwtValidationError::MalformedToken);
    };

    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Token header is not valid base64url");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Token header is not valid JSON");
        JwtValidationError::MalformedToken
    })?;

    // A kid that is absent, non-string, or empty is equally unusable
    match header.get("kid").and_then(serde_json::Value::as_str) {
        Some(kid) if !kid.is_empty() => Ok(kid.to_string()),
        _ => {
            tracing::debug!(target: "common.jwt", "Token header carries no usable kid");
            Err(JwtValidationError::MissingKid)
        }
    }
}
