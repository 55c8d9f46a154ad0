//! Nova Relay
//!
//! Entry point for the Nova Relay backend. Verifies caller identity
//! against the identity provider and relays requests to upstream chat,
//! news, weather, and search services.

use relay_service::auth::{JwksClient, TokenVerifier};
use relay_service::config::Config;
use relay_service::middleware::AuthMiddlewareState;
use relay_service::observability::init_metrics_recorder;
use relay_service::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Nova Relay");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        jwks_url = %config.jwks_url,
        jwks_cache_ttl_seconds = config.jwks_cache_ttl_seconds,
        "Configuration loaded successfully"
    );

    // Ensure the upload directory exists before accepting requests
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| {
            error!("Failed to create upload directory: {}", e);
            e
        })?;

    // Install the Prometheus recorder
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    // Build the token verifier
    let jwks_client = Arc::new(JwksClient::with_ttl(
        config.jwks_url.clone(),
        Duration::from_secs(config.jwks_cache_ttl_seconds),
    ));
    let auth_state = AuthMiddlewareState {
        verifier: Arc::new(TokenVerifier::new(jwks_client)),
    };

    // Parse bind address and drain time before moving config
    let bind_address = config.bind_address.clone();
    let drain_seconds = config.drain_seconds;

    // Create application state
    let state = Arc::new(AppState::from_config(config).map_err(|e| {
        error!("Failed to build application state: {}", e);
        e
    })?);

    // Build application routes
    let app = routes::build_routes(state, auth_state, metrics_handle);

    // Parse bind address
    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Nova Relay listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(drain_seconds))
    .await?;

    info!("Nova Relay shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and drain period is complete.
async fn shutdown_signal(drain_seconds: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    // Graceful shutdown drain period
    if drain_seconds > 0 {
        warn!("Draining connections for {} seconds...", drain_seconds);
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
        info!("Drain period complete");
    } else {
        info!("Skipping drain period (RELAY_DRAIN_SECONDS=0)");
    }
}
