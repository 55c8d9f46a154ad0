//! JWKS client for fetching and caching public keys from the identity provider.
//!
//! The JWKS (JSON Web Key Set) client fetches public keys from the identity
//! provider's `/.well-known/jwks.json` endpoint and caches them with a
//! configurable freshness window (1 hour by default).
//!
//! # Availability
//!
//! - Keys are cached to reduce load on the provider and improve latency
//! - An expired cache is refreshed on next use to pick up key rotations
//! - If a refresh fails but a previously fetched set exists, the stale set
//!   keeps serving lookups; the cache never transitions back to empty
//! - Only a cold-cache fetch failure is surfaced as an error

use crate::errors::RelayError;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// Default cache freshness window in seconds (1 hour).
const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

/// JSON Web Key from the JWKS endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (always "RSA" for RS256).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// Algorithm (should be "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,
}

/// JWKS response from the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Cached JWKS data with fetch time.
struct CachedJwks {
    /// Map of key ID to JWK.
    keys: HashMap<String, Jwk>,

    /// When this key set was fetched.
    fetched_at: Instant,
}

/// JWKS client for fetching and caching public keys.
///
/// Thread-safe client that fetches JWKS from the identity provider and
/// caches the keys. A stale set is retained across failed refreshes so
/// that transient provider outages do not take down token verification.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Cached JWKS data.
    cache: Arc<RwLock<Option<CachedJwks>>>,

    /// Cache freshness window.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client with the default 1-hour freshness window.
    pub fn new(jwks_url: String) -> Self {
        Self::with_ttl(jwks_url, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Create a new JWKS client with a custom freshness window.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL to the identity provider's JWKS endpoint
    /// * `cache_ttl` - How long a fetched key set is considered fresh
    pub fn with_ttl(jwks_url: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "relay.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl,
        }
    }

    /// Get a JWK by key ID.
    ///
    /// Serves from the cache while it is fresh. An expired cache triggers a
    /// refresh; if the refresh fails and a previous set exists, the stale set
    /// is used instead. An unknown `kid` in an otherwise usable set is a
    /// token problem, not a cache problem, and does not trigger a refetch.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::KeySetUnavailable` if no key set has ever been
    /// fetched and the fetch fails.
    /// Returns `RelayError::InvalidToken` if the key ID is not in the set.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, RelayError> {
        // Check cache first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        tracing::debug!(target: "relay.auth.jwks", kid = %kid, "JWKS cache hit");
                        return Ok(key.clone());
                    }
                    // Key not found in fresh cache
                    tracing::debug!(target: "relay.auth.jwks", kid = %kid, "Key not found in JWKS cache");
                    return Err(RelayError::InvalidToken(
                        "The access token is invalid or expired".to_string(),
                    ));
                }
            }
        }

        // Cache empty or expired - fetch a fresh key set
        if let Err(refresh_err) = self.refresh_cache().await {
            // Fall back to the stale set if one exists; only a cold cache
            // surfaces the fetch failure
            let cache = self.cache.read().await;
            let Some(cached) = cache.as_ref() else {
                return Err(refresh_err);
            };
            tracing::warn!(
                target: "relay.auth.jwks",
                stale_for_seconds = cached.fetched_at.elapsed().as_secs(),
                "JWKS refresh failed, serving stale key set"
            );
            return cached.keys.get(kid).cloned().ok_or_else(|| {
                RelayError::InvalidToken("The access token is invalid or expired".to_string())
            });
        }

        // Look up the key in the refreshed cache
        let cache = self.cache.read().await;
        if let Some(cached) = cache.as_ref() {
            if let Some(key) = cached.keys.get(kid) {
                return Ok(key.clone());
            }
        }

        tracing::warn!(target: "relay.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
        Err(RelayError::InvalidToken(
            "The access token is invalid or expired".to_string(),
        ))
    }

    /// Refresh the JWKS cache by fetching from the identity provider.
    ///
    /// On failure the existing cache is left untouched.
    #[instrument(skip(self))]
    async fn refresh_cache(&self) -> Result<(), RelayError> {
        tracing::debug!(target: "relay.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "relay.auth.jwks", error = %e, "Failed to fetch JWKS");
                RelayError::KeySetUnavailable("JWKS endpoint unreachable".to_string())
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "relay.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(RelayError::KeySetUnavailable(
                "JWKS endpoint returned error".to_string(),
            ));
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "relay.auth.jwks", error = %e, "Failed to parse JWKS response");
            RelayError::KeySetUnavailable("JWKS response malformed".to_string())
        })?;

        // Build key map
        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .map(|key| (key.kid.clone(), key))
            .collect();

        tracing::info!(
            target: "relay.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        // Update cache
        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(())
    }
}
