//! Token verification against the identity provider's key set.
//!
//! Verifies incoming JWTs using RSA public keys fetched from the JWKS
//! endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only the RS256 algorithm is accepted; the allowed algorithm comes from
//!   this module, never from the token header, so an HS256 token signed with
//!   the public key material cannot pass (algorithm confusion)
//! - Audience is intentionally not validated; tokens are checked for
//!   authenticity and liveness only
//! - Generic error messages prevent information leakage

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::errors::RelayError;
use common::jwt::extract_kid;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::instrument;

/// Token verifier using JWKS from the identity provider.
pub struct TokenVerifier {
    /// JWKS client for fetching public keys.
    jwks_client: Arc<JwksClient>,
}

impl TokenVerifier {
    /// Create a new token verifier.
    pub fn new(jwks_client: Arc<JwksClient>) -> Self {
        Self { jwks_client }
    }

    /// Verify a JWT and return the claims.
    ///
    /// # Security Checks
    ///
    /// 1. Size check - reject tokens > 8KB before parsing
    /// 2. Extract kid from header to find the correct key
    /// 3. Fetch public key from JWKS
    /// 4. Verify RS256 signature
    /// 5. Validate exp/nbf claims when the token carries them
    /// 6. Require a non-empty `sub` claim
    ///
    /// # Errors
    ///
    /// Returns `RelayError::InvalidToken` for all validation failures with a
    /// generic message to prevent information leakage, or
    /// `RelayError::KeySetUnavailable` when no key set can be obtained.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Claims, RelayError> {
        // 1. Extract kid from JWT header (includes size check via common::jwt)
        let kid = extract_kid(token).map_err(|e| {
            tracing::debug!(target: "relay.auth.jwt", error = ?e, "Token kid extraction failed");
            RelayError::InvalidToken("The access token is invalid or expired".to_string())
        })?;

        // 2. Fetch public key from JWKS
        let jwk = self.jwks_client.get_key(&kid).await?;

        // 3. Verify signature and extract claims
        let claims = verify_token(token, &jwk)?;

        // 4. A verified token without a subject is unusable
        if claims.sub.is_empty() {
            tracing::debug!(target: "relay.auth.jwt", "Token has empty sub claim");
            return Err(RelayError::InvalidToken(
                "The access token is invalid or expired".to_string(),
            ));
        }

        tracing::debug!(target: "relay.auth.jwt", "Token verified successfully");
        Ok(claims)
    }
}

/// Verify JWT signature and extract claims.
///
/// Uses the RS256 algorithm exclusively. The JWK is validated before the
/// decoding key is built so a key of the wrong type fails fast.
fn verify_token(token: &str, jwk: &Jwk) -> Result<Claims, RelayError> {
    // Validate JWK is an RSA signing key
    if jwk.kty != "RSA" {
        tracing::warn!(target: "relay.auth.jwt", kty = %jwk.kty, "Unexpected JWK key type");
        return Err(RelayError::InvalidToken(
            "The access token is invalid or expired".to_string(),
        ));
    }
    if let Some(alg) = &jwk.alg {
        if alg != "RS256" {
            tracing::warn!(target: "relay.auth.jwt", alg = %alg, "Unexpected JWK algorithm");
            return Err(RelayError::InvalidToken(
                "The access token is invalid or expired".to_string(),
            ));
        }
    }

    // Get RSA components from JWK
    let modulus = jwk.n.as_ref().ok_or_else(|| {
        tracing::error!(target: "relay.auth.jwt", kid = %jwk.kid, "JWK missing n field");
        RelayError::InvalidToken("The access token is invalid or expired".to_string())
    })?;
    let exponent = jwk.e.as_ref().ok_or_else(|| {
        tracing::error!(target: "relay.auth.jwt", kid = %jwk.kid, "JWK missing e field");
        RelayError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    // Create decoding key from base64url RSA components
    let decoding_key = DecodingKey::from_rsa_components(modulus, exponent).map_err(|e| {
        tracing::error!(target: "relay.auth.jwt", error = %e, "Invalid RSA key components");
        RelayError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    // Configure validation: RS256 only, exp/nbf enforced when present but
    // not required, audience not checked
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_aud = false;
    validation.required_spec_claims = Default::default();

    // Decode and verify
    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(target: "relay.auth.jwt", error = %e, "Token verification failed");
        RelayError::InvalidToken("The access token is invalid or expired".to_string())
    })?;

    Ok(token_data.claims)
}
