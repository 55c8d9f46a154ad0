//! Web search integration tests.
//!
//! Exercises POST /search-web against a mocked HTML search upstream.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use relay_test_utils::TestRelayServer;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const RESULTS_PAGE: &str = r#"
<html><body>
  <table>
    <tr><td>
      <a class="result-link" href="https://www.rust-lang.org/">Rust Programming Language</a>
    </td></tr>
    <tr><td>
      <a class="result-link" href="https://doc.rust-lang.org/book/">The Rust Book</a>
    </td></tr>
    <tr><td>
      <a href="https://example.com/ad">Sponsored</a>
    </td></tr>
  </table>
</body></html>
"#;

#[tokio::test]
async fn test_search_returns_scraped_hits() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/lite/"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/search-web", server.url()))
        .json(&json!({"query": "rust"}))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    let results = body["results"].as_array().expect("results should be an array");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Rust Programming Language");
    assert_eq!(results[0]["url"], "https://www.rust-lang.org/");
    assert_eq!(results[1]["title"], "The Rust Book");

    Ok(())
}

#[tokio::test]
async fn test_empty_query_rejected_with_message_body() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/search-web", server.url()))
        .json(&json!({"query": ""}))
        .send()
        .await?;

    // The rejection still carries a results array the frontend can render
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["results"], json!(["No query provided."]));

    Ok(())
}

#[tokio::test]
async fn test_no_hits_is_200_with_message() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/lite/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>nothing</body></html>"),
        )
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/search-web", server.url()))
        .json(&json!({"query": "xyzzy"}))
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["results"], json!(["No results found for \"xyzzy\"."]));

    Ok(())
}

#[tokio::test]
async fn test_search_upstream_failure_is_502() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/lite/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/search-web", server.url()))
        .json(&json!({"query": "rust"}))
        .send()
        .await?;

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    Ok(())
}
