//! News headlines client.
//!
//! Relays headline requests to the news API, either top headlines for a
//! supported country or a topic search. Responses are formatted into the
//! single-string digest the frontend renders directly.

use crate::errors::RelayError;
use crate::observability::metrics::record_upstream_request;
use common::secret::{ExposeSecret, SecretString};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{error, instrument, warn};

/// Timeout for news requests in seconds.
const NEWS_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Number of articles included in a digest.
const DIGEST_ARTICLE_LIMIT: usize = 5;

/// Map a lowercase country name to its two-letter news API code.
///
/// Only this fixed set is supported; anything else is a bad request.
pub fn country_code(country: &str) -> Option<&'static str> {
    match country {
        "united states" => Some("us"),
        "india" => Some("in"),
        "united kingdom" => Some("gb"),
        "canada" => Some("ca"),
        "germany" => Some("de"),
        "france" => Some("fr"),
        "australia" => Some("au"),
        "japan" => Some("jp"),
        "china" => Some("cn"),
        _ => None,
    }
}

/// A single news article.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    /// Article headline.
    pub title: String,

    /// Publishing outlet.
    pub source: ArticleSource,
}

/// Publishing outlet of an article.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSource {
    /// Outlet display name.
    pub name: String,
}

/// Response body from the news API.
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Format articles into a one-line-per-headline digest.
///
/// Each line is "{prefix} {title} - {source}". An empty list yields
/// "No news found.".
pub fn format_digest(prefix: &str, articles: &[Article]) -> String {
    if articles.is_empty() {
        return "No news found.".to_string();
    }

    articles
        .iter()
        .map(|a| format!("{prefix} {} - {}", a.title, a.source.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// HTTP client for the news API.
#[derive(Clone)]
pub struct NewsClient {
    /// HTTP client with configured timeouts.
    client: Client,

    /// News API base URL.
    base_url: String,

    /// Upstream API key, if configured.
    api_key: Option<SecretString>,
}

impl NewsClient {
    /// Create a new news client.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String, api_key: Option<SecretString>) -> Result<Self, RelayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(NEWS_REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                error!(target: "relay.services.news", error = %e, "Failed to build HTTP client");
                RelayError::Internal
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Fetch top headlines for a country code.
    ///
    /// Returns at most [`DIGEST_ARTICLE_LIMIT`] articles.
    #[instrument(skip(self), fields(country = %code))]
    pub async fn top_headlines(&self, code: &str) -> Result<Vec<Article>, RelayError> {
        let url = format!("{}/top-headlines", self.base_url);
        self.fetch_articles(&url, &[("country", code)]).await
    }

    /// Fetch headlines matching a topic.
    ///
    /// Returns at most [`DIGEST_ARTICLE_LIMIT`] articles.
    #[instrument(skip(self), fields(topic = %topic))]
    pub async fn search(&self, topic: &str) -> Result<Vec<Article>, RelayError> {
        let url = format!("{}/search", self.base_url);
        self.fetch_articles(&url, &[("q", topic)]).await
    }

    async fn fetch_articles(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<Article>, RelayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(RelayError::MissingApiKey("news"))?;

        let start = Instant::now();
        let result = self.send_request(url, params, api_key).await;
        let status = if result.is_ok() { "success" } else { "error" };
        record_upstream_request("news", status, start.elapsed());

        result
    }

    async fn send_request(
        &self,
        url: &str,
        params: &[(&str, &str)],
        api_key: &SecretString,
    ) -> Result<Vec<Article>, RelayError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("token", api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| {
                warn!(target: "relay.services.news", error = %e, "News upstream request failed");
                RelayError::Upstream {
                    service: "news",
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "relay.services.news", status = %status, "News upstream returned error");
            return Err(RelayError::Upstream {
                service: "news",
                reason: format!("status {status}"),
            });
        }

        let body: NewsApiResponse = response.json().await.map_err(|e| {
            error!(target: "relay.services.news", error = %e, "Failed to parse news response");
            RelayError::Upstream {
                service: "news",
                reason: "malformed response".to_string(),
            }
        })?;

        let mut articles = body.articles;
        articles.truncate(DIGEST_ARTICLE_LIMIT);
        Ok(articles)
    }
}
