//! HTTP routes for the relay service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::errors::RelayError;
use crate::handlers;
use crate::middleware::{authenticate, http_metrics_middleware, AuthMiddlewareState};
use crate::services::{ChatClient, ChatMessage, NewsClient, SearchClient, WeatherClient};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Maximum accepted request body size in bytes (25 MB, for uploads).
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across all handlers.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Chat completion upstream client.
    pub chat: ChatClient,

    /// News upstream client.
    pub news: NewsClient,

    /// Weather upstream client.
    pub weather: WeatherClient,

    /// Web search client.
    pub search: SearchClient,

    /// Shared conversation history, process-lifetime.
    pub chat_history: Mutex<Vec<ChatMessage>>,
}

impl AppState {
    /// Build application state, constructing the upstream clients from
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Internal` if an HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, RelayError> {
        let chat = ChatClient::new(config.chat_api_url.clone(), config.groq_api_key.clone())?;
        let news = NewsClient::new(config.news_api_url.clone(), config.gnews_api_key.clone())?;
        let weather = WeatherClient::new(
            config.weather_api_url.clone(),
            config.weather_api_key.clone(),
        )?;
        let search = SearchClient::new(config.search_url.clone())?;

        Ok(Self {
            config,
            chat,
            news,
            weather,
            search,
            chat_history: Mutex::new(Vec::new()),
        })
    }
}

/// Build the application routes.
///
/// Creates an Axum router with the full endpoint surface plus global
/// middleware. Layer order (outermost first):
///
/// 1. HTTP metrics - records every response, including framework errors
/// 2. Body size limit - raised above the axum default for uploads
/// 3. CORS - permissive, the service fronts a browser app
/// 4. Timeout - 30 second request timeout
/// 5. TraceLayer - request logging
/// 6. Authentication - fail-open identity attachment
pub fn build_routes(
    state: Arc<AppState>,
    auth_state: AuthMiddlewareState,
    metrics_handle: PrometheusHandle,
) -> Router {
    let api_routes = Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/datetime", get(handlers::get_datetime))
        .route("/me", get(handlers::get_me))
        .route("/chat", post(handlers::chat))
        .route("/analyze-pdf", post(handlers::analyze_pdf))
        .route("/analyze-image", post(handlers::analyze_image))
        .route("/search-web", post(handlers::search_web))
        .route("/news/country", get(handlers::news_by_country))
        .route("/news/topic", get(handlers::news_by_topic))
        .route("/weather", get(handlers::get_weather))
        .layer(middleware::from_fn_with_state(auth_state, authenticate))
        .with_state(state);

    // Operational endpoint, outside the authenticated surface
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(http_metrics_middleware))
}
