//! Relay service configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default JWKS cache freshness window in seconds (1 hour).
pub const DEFAULT_JWKS_CACHE_TTL_SECONDS: u64 = 3600;

/// Default JWKS endpoint of the identity provider.
pub const DEFAULT_JWKS_URL: &str =
    "https://helpful-ladybird-48.clerk.accounts.dev/.well-known/jwks.json";

/// Default chat completion endpoint.
pub const DEFAULT_CHAT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default news API base URL.
pub const DEFAULT_NEWS_API_URL: &str = "https://gnews.io/api/v4";

/// Default weather API base URL.
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.weatherapi.com/v1";

/// Default web search endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://lite.duckduckgo.com/lite/";

/// Default directory for uploaded files awaiting extraction.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default graceful shutdown drain time in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 5;

/// Relay service configuration.
///
/// Loaded from environment variables with sensible defaults.
/// Upstream API keys are redacted in Debug output to prevent credential
/// leakage.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// URL of the identity provider's JWKS endpoint.
    pub jwks_url: String,

    /// How long a fetched key set is considered fresh, in seconds.
    pub jwks_cache_ttl_seconds: u64,

    /// API key for the chat completion upstream, if configured.
    pub groq_api_key: Option<SecretString>,

    /// API key for the news upstream, if configured.
    pub gnews_api_key: Option<SecretString>,

    /// API key for the weather upstream, if configured.
    pub weather_api_key: Option<SecretString>,

    /// Chat completion endpoint URL.
    pub chat_api_url: String,

    /// News API base URL.
    pub news_api_url: String,

    /// Weather API base URL.
    pub weather_api_url: String,

    /// Web search endpoint URL.
    pub search_url: String,

    /// Directory where uploaded files are written before extraction.
    pub upload_dir: String,

    /// Seconds to wait for in-flight requests during shutdown.
    pub drain_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("jwks_url", &self.jwks_url)
            .field("jwks_cache_ttl_seconds", &self.jwks_cache_ttl_seconds)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("gnews_api_key", &self.gnews_api_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "weather_api_key",
                &self.weather_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("chat_api_url", &self.chat_api_url)
            .field("news_api_url", &self.news_api_url)
            .field("weather_api_url", &self.weather_api_url)
            .field("search_url", &self.search_url)
            .field("upload_dir", &self.upload_dir)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JWKS cache TTL configuration: {0}")]
    InvalidJwksCacheTtl(String),

    #[error("Invalid drain configuration: {0}")]
    InvalidDrainSeconds(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwks_url = vars
            .get("JWKS_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_JWKS_URL.to_string());

        // Parse JWKS cache TTL with validation
        let jwks_cache_ttl_seconds = if let Some(value_str) = vars.get("JWKS_CACHE_TTL_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwksCacheTtl(format!(
                    "JWKS_CACHE_TTL_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidJwksCacheTtl(
                    "JWKS_CACHE_TTL_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_JWKS_CACHE_TTL_SECONDS
        };

        let groq_api_key = vars
            .get("GROQ_API_KEY")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        let gnews_api_key = vars
            .get("GNEWS_API_KEY")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        let weather_api_key = vars
            .get("WEATHER_API_KEY")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()));

        let chat_api_url = vars
            .get("CHAT_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string());

        let news_api_url = vars
            .get("NEWS_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string());

        let weather_api_url = vars
            .get("WEATHER_API_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string());

        let search_url = vars
            .get("SEARCH_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());

        let upload_dir = vars
            .get("UPLOAD_DIR")
            .cloned()
            .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());

        // Parse drain seconds with validation
        let drain_seconds = if let Some(value_str) = vars.get("RELAY_DRAIN_SECONDS") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidDrainSeconds(format!(
                    "RELAY_DRAIN_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_DRAIN_SECONDS
        };

        Ok(Config {
            bind_address,
            jwks_url,
            jwks_cache_ttl_seconds,
            groq_api_key,
            gnews_api_key,
            weather_api_key,
            chat_api_url,
            news_api_url,
            weather_api_url,
            search_url,
            upload_dir,
            drain_seconds,
        })
    }
}
