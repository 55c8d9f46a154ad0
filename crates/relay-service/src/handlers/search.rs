//! Web search handler.
//!
//! The response body always has a `results` array, but its element type
//! depends on the outcome: structured hits on success, human-readable
//! message strings when there is nothing to show. The frontend renders
//! whichever it receives.

use crate::errors::RelayError;
use crate::routes::AppState;
use crate::services::SearchHit;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Request body for POST /search-web.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free-text search query.
    #[serde(default)]
    pub query: String,
}

/// Either structured hits or fallback message strings.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SearchResults {
    /// Scraped result links.
    Hits(Vec<SearchHit>),

    /// Human-readable messages (no query, no results).
    Messages(Vec<String>),
}

/// Response body for POST /search-web.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Search outcome.
    pub results: SearchResults,
}

/// Handler for POST /search-web
///
/// Runs the query against the search upstream and returns scraped result
/// links. A missing query is a 400 whose body still carries a `results`
/// array; an empty result set is a 200 with a fallback message.
///
/// ## Errors
///
/// - 502 if the upstream call fails
#[instrument(skip_all, name = "relay.handlers.search")]
pub async fn search_web(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, RelayError> {
    if request.query.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(SearchResponse {
                results: SearchResults::Messages(vec!["No query provided.".to_string()]),
            }),
        ));
    }

    let hits = state.search.search(&request.query).await?;

    let results = if hits.is_empty() {
        SearchResults::Messages(vec![format!(
            "No results found for \"{}\".",
            request.query
        )])
    } else {
        SearchResults::Hits(hits)
    };

    Ok((StatusCode::OK, Json(SearchResponse { results })))
}
