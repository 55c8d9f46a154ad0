//! Weather relay integration tests.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use relay_test_utils::TestRelayServer;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_weather_report_for_city() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/weather/current.json"))
        .and(query_param("q", "London"))
        .and(query_param("key", "test-weather-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "location": {"name": "London", "country": "United Kingdom"},
            "current": {
                "condition": {"text": "Light rain"},
                "temp_c": 14.0,
                "temp_f": 57.2,
                "humidity": 82
            }
        })))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/weather", server.url()))
        .query(&[("city", "London")])
        .send()
        .await?;

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["location"], "London");
    assert_eq!(body["condition"], "Light rain");
    assert_eq!(body["temp_c"], 14.0);
    assert_eq!(body["temp_f"], 57.2);

    Ok(())
}

#[tokio::test]
async fn test_missing_city_rejected() -> Result<()> {
    let server = TestRelayServer::spawn().await?;

    let response = reqwest::get(format!("{}/weather", server.url())).await?;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "City required");

    Ok(())
}

#[tokio::test]
async fn test_weather_upstream_failure_is_502() -> Result<()> {
    let server = TestRelayServer::spawn().await?;
    Mock::given(method("GET"))
        .and(path("/weather/current.json"))
        .respond_with(ResponseTemplate::new(400))
        .mount(server.upstream())
        .await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/weather", server.url()))
        .query(&[("city", "Nowhereville")])
        .send()
        .await?;

    assert_eq!(response.status(), 502);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    Ok(())
}
