//! News digest handlers.
//!
//! Both endpoints reduce upstream articles to a preformatted digest string
//! the frontend renders directly.

use crate::errors::RelayError;
use crate::models::TextResponse;
use crate::routes::AppState;
use crate::services::news_client::{country_code, format_digest};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Digest line prefix for country headlines.
const COUNTRY_PREFIX: &str = "\u{1F4F0}";

/// Digest line prefix for topic headlines.
const TOPIC_PREFIX: &str = "\u{1F5DE}\u{FE0F}";

/// Query parameters for GET /news/country.
#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    /// Country name (case-insensitive, from the supported set).
    #[serde(default)]
    pub country: String,
}

/// Query parameters for GET /news/topic.
#[derive(Debug, Deserialize)]
pub struct TopicQuery {
    /// Free-text topic.
    #[serde(default)]
    pub topic: String,
}

/// Handler for GET /news/country
///
/// Returns the top headlines for a supported country as a digest string.
///
/// ## Errors
///
/// - 400 if the country is missing or not in the supported set
/// - 500 if no news API key is configured
/// - 502 if the upstream call fails
#[instrument(skip_all, name = "relay.handlers.news_country")]
pub async fn news_by_country(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<TextResponse>, RelayError> {
    let code = country_code(&query.country.to_lowercase())
        .ok_or_else(|| RelayError::BadRequest("Unsupported country".to_string()))?;

    let articles = state.news.top_headlines(code).await?;

    Ok(Json(TextResponse {
        response: format_digest(COUNTRY_PREFIX, &articles),
    }))
}

/// Handler for GET /news/topic
///
/// Returns headlines matching a free-text topic as a digest string.
///
/// ## Errors
///
/// - 400 if the topic is missing
/// - 500 if no news API key is configured
/// - 502 if the upstream call fails
#[instrument(skip_all, name = "relay.handlers.news_topic")]
pub async fn news_by_topic(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<TextResponse>, RelayError> {
    if query.topic.is_empty() {
        return Err(RelayError::BadRequest("Topic required".to_string()));
    }

    let articles = state.news.search(&query.topic).await?;

    Ok(Json(TextResponse {
        response: format_digest(TOPIC_PREFIX, &articles),
    }))
}
