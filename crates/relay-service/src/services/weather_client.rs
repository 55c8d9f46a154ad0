//! Current weather client.
//!
//! Relays city lookups to the weather API and reduces the response to the
//! four fields the frontend displays.

use crate::errors::RelayError;
use crate::observability::metrics::record_upstream_request;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Timeout for weather requests in seconds.
const WEATHER_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Response body from the weather API (relevant fields only).
#[derive(Debug, Deserialize)]
struct WeatherApiResponse {
    location: Location,
    current: Current,
}

#[derive(Debug, Deserialize)]
struct Location {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Current {
    condition: Condition,
    temp_c: f64,
    temp_f: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

/// Current conditions for a resolved location.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    /// Resolved location name.
    pub location: String,

    /// Condition text (e.g., "Partly cloudy").
    pub condition: String,

    /// Temperature in Celsius.
    pub temp_c: f64,

    /// Temperature in Fahrenheit.
    pub temp_f: f64,
}

/// HTTP client for the weather API.
#[derive(Clone)]
pub struct WeatherClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Weather API base URL.
    base_url: String,

    /// Upstream API key, if configured.
    api_key: Option<SecretString>,
}

impl WeatherClient {
    /// Create a new weather client.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String, api_key: Option<SecretString>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WEATHER_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "relay.services.weather", error = %e, "Failed to build HTTP client");
                RelayError::Internal
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Fetch current conditions for a city.
    ///
    /// # Errors
    ///
    /// - `RelayError::MissingApiKey` if no API key is configured
    /// - `RelayError::Upstream` if the endpoint is unreachable, returns a
    ///   non-success status, or the response cannot be parsed
    #[instrument(skip(self), fields(city = %city))]
    pub async fn current(&self, city: &str) -> Result<WeatherReport, RelayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(RelayError::MissingApiKey("weather"))?;

        let start = Instant::now();
        let result = self.send_request(city, api_key).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_upstream_request("weather", status, start.elapsed());

        result
    }

    async fn send_request(
        &self,
        city: &str,
        api_key: &SecretString,
    ) -> Result<WeatherReport, RelayError> {
        let url = format!("{}/current.json", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key.expose_secret()), ("q", city)])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "relay.services.weather", error = %e, "Weather upstream request failed");
                RelayError::Upstream {
                    service: "weather",
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "relay.services.weather", status = %status, "Weather upstream returned error");
            return Err(RelayError::Upstream {
                service: "weather",
                reason: format!("status {status}"),
            });
        }

        let body: WeatherApiResponse = response.json().await.map_err(|e| {
            error!(target: "relay.services.weather", error = %e, "Failed to parse weather response");
            RelayError::Upstream {
                service: "weather",
                reason: "malformed response".to_string(),
            }
        })?;

        Ok(WeatherReport {
            location: body.location.name,
            condition: body.current.condition.text,
            temp_c: body.current.temp_c,
            temp_f: body.current.temp_f,
        })
    }
}
