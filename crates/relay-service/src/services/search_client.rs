//! Web search client backed by HTML scraping.
//!
//! The search upstream has no JSON API; results come from the lightweight
//! HTML interface and are extracted from `a.result-link` anchors. Parsing
//! happens in a synchronous helper after the body has been read so the
//! non-`Send` DOM never crosses an await point.

use crate::errors::RelayError;
use crate::observability::metrics::record_upstream_request;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Timeout for search requests in seconds.
const SEARCH_REQUEST_TIMEOUT_SECS: u64 = 10;

/// CSS selector for result anchors in the lite HTML interface.
const RESULT_LINK_SELECTOR: &str = "a.result-link";

/// A single search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Link text of the result.
    pub title: String,

    /// Target URL.
    pub url: String,
}

/// HTTP client for the web search upstream.
#[derive(Clone)]
pub struct SearchClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Search endpoint URL.
    search_url: String,
}

impl SearchClient {
    /// Create a new search client.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if the HTTP client cannot be built.
    pub fn new(search_url: String) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEARCH_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "relay.services.search", error = %e, "Failed to build HTTP client");
                RelayError::Internal
            })?;

        Ok(Self { client, search_url })
    }

    /// Run a search and return the scraped result links.
    ///
    /// An empty result list is a valid outcome, not an error; the handler
    /// decides how to present it.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Upstream` if the endpoint is unreachable or
    /// returns a non-success status.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, RelayError> {
        let start = Instant::now();
        let result = self.send_request(query).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_upstream_request("search", status, start.elapsed());

        result
    }

    async fn send_request(&self, query: &str) -> Result<Vec<SearchHit>, RelayError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "relay.services.search", error = %e, "Search upstream request failed");
                RelayError::Upstream {
                    service: "search",
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "relay.services.search", status = %status, "Search upstream returned error");
            return Err(RelayError::Upstream {
                service: "search",
                reason: format!("status {status}"),
            });
        }

        let body = response.text().await.map_err(|e| {
            error!(target: "relay.services.search", error = %e, "Failed to read search response body");
            RelayError::Upstream {
                service: "search",
                reason: "unreadable response".to_string(),
            }
        })?;

        Ok(extract_result_links(&body))
    }
}

/// Extract result links from the search HTML.
///
/// Anchors without an `href` are skipped. Link text is whitespace-trimmed.
fn extract_result_links(html: &str) -> Vec<SearchHit> {
    // The selector is a compile-time constant; parse failure would be a bug
    let Ok(selector) = Selector::parse(RESULT_LINK_SELECTOR) else {
        error!(target: "relay.services.search", "Invalid result link selector");
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&selector)
        .filter_map(|anchor| {
            let url = anchor.value().attr("href")?.to_string();
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(SearchHit { title, url })
        })
        .collect()
}
