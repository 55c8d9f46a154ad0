//! Current weather handler.

use crate::errors::RelayError;
use crate::routes::AppState;
use crate::services::WeatherReport;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Query parameters for GET /weather.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// City name or location query.
    #[serde(default)]
    pub city: String,
}

/// Handler for GET /weather
///
/// Returns current conditions for the requested city.
///
/// ## Response
///
/// ```json
/// {
///   "location": "Paris",
///   "condition": "Partly cloudy",
///   "temp_c": 18.5,
///   "temp_f": 65.3
/// }
/// ```
///
/// ## Errors
///
/// - 400 if the city is missing
/// - 500 if no weather API key is configured
/// - 502 if the upstream call fails
#[instrument(skip_all, name = "relay.handlers.weather")]
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherReport>, RelayError> {
    if query.city.is_empty() {
        return Err(RelayError::BadRequest("City required".to_string()));
    }

    let report = state.weather.current(&query.city).await?;
    Ok(Json(report))
}
