//! Test server harness for E2E testing
//!
//! Provides `TestRelayServer` for spawning real relay instances in tests,
//! with mock identity provider and upstream servers wired in.

use crate::keys::TestKeypair;
use metrics_exporter_prometheus::PrometheusBuilder;
use relay_service::auth::{JwksClient, TokenVerifier};
use relay_service::config::Config;
use relay_service::middleware::AuthMiddlewareState;
use relay_service::observability::init_metrics_recorder;
use relay_service::routes::{self, AppState};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test harness for spawning the relay server in E2E tests.
///
/// The harness starts two wiremock servers alongside the relay:
/// one playing the identity provider (serving the fixture JWKS) and one
/// playing every upstream API. Tests register upstream expectations on
/// [`upstream()`](Self::upstream) before making requests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_me_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestRelayServer::spawn().await?;
///     let client = reqwest::Client::new();
///
///     let response = client
///         .get(format!("{}/me", server.url()))
///         .bearer_auth(server.token_for("user_123"))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestRelayServer {
    addr: SocketAddr,
    config: Config,
    keypair: TestKeypair,
    jwks: MockServer,
    upstream: MockServer,
    _handle: JoinHandle<()>,
}

impl TestRelayServer {
    /// Spawn a new test server instance.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Serve the fixture JWKS from a mock identity provider
    /// - Point every upstream URL at a shared mock server
    /// - Start the HTTP server in the background
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let keypair = TestKeypair::new();

        // Mock identity provider serving the fixture key set
        let jwks = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(keypair.jwks_json()))
            .mount(&jwks)
            .await;

        // Mock upstream for chat, news, weather and search. Tests mount
        // their own expectations; unmatched calls get wiremock's 404,
        // which the relay surfaces as an upstream error.
        let upstream = MockServer::start().await;

        // Bind first so the upload directory can be port-scoped and
        // isolated between concurrently running test servers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;
        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let upload_dir = std::env::temp_dir().join(format!("nova-relay-test-{}", addr.port()));

        // Build configuration for the test environment
        let vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), addr.to_string()),
            (
                "JWKS_URL".to_string(),
                format!("{}/.well-known/jwks.json", jwks.uri()),
            ),
            ("GROQ_API_KEY".to_string(), "test-groq-key".to_string()),
            ("GNEWS_API_KEY".to_string(), "test-gnews-key".to_string()),
            (
                "WEATHER_API_KEY".to_string(),
                "test-weather-key".to_string(),
            ),
            (
                "CHAT_API_URL".to_string(),
                format!("{}/openai/v1/chat/completions", upstream.uri()),
            ),
            ("NEWS_API_URL".to_string(), format!("{}/news", upstream.uri())),
            (
                "WEATHER_API_URL".to_string(),
                format!("{}/weather", upstream.uri()),
            ),
            ("SEARCH_URL".to_string(), format!("{}/lite/", upstream.uri())),
            (
                "UPLOAD_DIR".to_string(),
                upload_dir.to_string_lossy().to_string(),
            ),
            ("RELAY_DRAIN_SECONDS".to_string(), "0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        // Initialize metrics recorder for the test server.
        // Note: This may fail if already installed in the test process.
        // In that case, we create a new recorder without installing it globally.
        let metrics_handle = match init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        // Build the token verifier against the mock identity provider
        let jwks_client = Arc::new(JwksClient::with_ttl(
            config.jwks_url.clone(),
            Duration::from_secs(config.jwks_cache_ttl_seconds),
        ));
        let auth_state = AuthMiddlewareState {
            verifier: Arc::new(TokenVerifier::new(jwks_client)),
        };

        // Create application state and routes using the real builders
        let state = Arc::new(
            AppState::from_config(config.clone())
                .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?,
        );
        let app = routes::build_routes(state, auth_state, metrics_handle);

        // Spawn server in background
        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            keypair,
            jwks,
            upstream,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Mock identity provider, for replacing the JWKS response.
    pub fn jwks(&self) -> &MockServer {
        &self.jwks
    }

    /// Mock upstream server, for mounting chat/news/weather/search
    /// expectations.
    pub fn upstream(&self) -> &MockServer {
        &self.upstream
    }

    /// Keypair the mock identity provider publishes.
    pub fn keypair(&self) -> &TestKeypair {
        &self.keypair
    }

    /// Mint a valid bearer token for the given subject.
    pub fn token_for(&self, sub: &str) -> String {
        self.keypair.sign_token(sub)
    }
}

impl Drop for TestRelayServer {
    fn drop(&mut self) {
        // Explicitly abort the HTTP server task to ensure immediate cleanup
        // when the test completes.
        self._handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_spawns_successfully() -> Result<(), anyhow::Error> {
        let server = TestRelayServer::spawn().await?;

        assert!(server.url().starts_with("http://127.0.0.1:"));

        let response = reqwest::get(server.url()).await?;
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["message"], "✅ Nova Relay backend is running.");

        Ok(())
    }

    #[tokio::test]
    async fn test_server_provides_addr() -> Result<(), anyhow::Error> {
        let server = TestRelayServer::spawn().await?;

        let addr = server.addr();
        assert!(addr.ip().is_loopback());
        assert!(addr.port() > 0);
        assert_eq!(server.url(), format!("http://{}", addr));

        Ok(())
    }

    #[tokio::test]
    async fn test_multiple_servers_different_ports() -> Result<(), anyhow::Error> {
        let server1 = TestRelayServer::spawn().await?;
        let server2 = TestRelayServer::spawn().await?;

        assert_ne!(server1.addr(), server2.addr());

        let response1 = reqwest::get(server1.url()).await?;
        assert_eq!(response1.status(), 200);

        let response2 = reqwest::get(server2.url()).await?;
        assert_eq!(response2.status(), 200);

        Ok(())
    }

    #[tokio::test]
    async fn test_server_config_points_at_mocks() -> Result<(), anyhow::Error> {
        let server = TestRelayServer::spawn().await?;

        let config = server.config();
        assert!(config.jwks_url.starts_with(&server.jwks().uri()));
        assert!(config.chat_api_url.starts_with(&server.upstream().uri()));
        assert!(config.news_api_url.starts_with(&server.upstream().uri()));
        assert!(config.weather_api_url.starts_with(&server.upstream().uri()));
        assert!(config.search_url.starts_with(&server.upstream().uri()));

        Ok(())
    }
}
