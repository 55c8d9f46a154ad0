//! News digest integration tests.
//!
//! Exercises GET /news/country and GET /news/topic against a mocked
//! news upstream.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use relay_test_utils::TestRelayServer;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn articles_body() -> serde_json::Value {
    json!({
        "articles": [
            {"title": "Markets rally", "source": {"name": "The Wire"}},
            {"title": "Storm warning", "source": {"name": "Daily Post"}}
        ]
    })
}

#[tokio::test]
async fn test_country_headlines_digest() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/news/top-headlines"))
        .and(query_param("country", "us"))
        .and(query_param("token", "test-gnews-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_body()))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/news/country", server.url()))
        .query(&[("country", "United States")])
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["response"],
        "\u{1F4F0} Markets rally - The Wire\n\u{1F4F0} Storm warning - Daily Post"
    );

    Ok(())
}

#[tokio::test]
async fn test_unsupported_country_rejected() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/news/country", server.url()))
        .query(&[("country", "Atlantis")])
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Unsupported country");

    Ok(())
}

#[tokio::test]
async fn test_missing_country_rejected() -> Result<()> {
    let server = TestRelayServer::spawn().await?;

    let response = reqwest::get(format!("{}/news/country", server.url())).await?;
    assert_eq!(response.status(), 400);

    Ok(())
}

#[tokio::test]
async fn test_topic_headlines_digest() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/news/search"))
        .and(query_param("q", "space"))
        .and(query_param("token", "test-gnews-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "articles": [{"title": "Launch succeeds", "source": {"name": "Orbit News"}}]
        })))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/news/topic", server.url()))
        .query(&[("topic", "space")])
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(
        body["response"],
        "\u{1F5DE}\u{FE0F} Launch succeeds - Orbit News"
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_topic_rejected() -> Result<()> {
    let server = TestRelayServer::spawn().await?;

    let response = reqwest::get(format!("{}/news/topic", server.url())).await?;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "Topic required");

    Ok(())
}

#[tokio::test]
async fn test_no_articles_yields_fallback_digest() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/news/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"articles": []})))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/news/topic", server.url()))
        .query(&[("topic", "nothing-matches")])
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["response"], "No news found.");

    Ok(())
}

#[tokio::test]
async fn test_news_upstream_failure_is_502() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/news/top-headlines"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/news/country", server.url()))
        .query(&[("country", "Japan")])
        .send()
        .await?;

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    Ok(())
}
