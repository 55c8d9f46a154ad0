//! Request metrics middleware.
//!
//! Sits outermost in the layer stack so every response gets measured,
//! including ones the framework produces before a handler runs: body
//! limit rejections, JSON parse failures, 404s, 405s. Paths are
//! normalized against the static route table before they become labels.

use crate::observability::metrics::record_http_request;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Records method, normalized endpoint, status code and latency for
/// every response passing through the router.
pub async fn http_metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    record_http_request(&method, &path, response.status().as_u16(), start.elapsed());
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    // Mini router shaped like the relay surface: one healthy endpoint,
    // one that answers like a failed upstream relay
    fn test_app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/weather",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    async fn send(app: Router, uri: &str) -> StatusCode {
        let request = HttpRequest::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_response_passes_through_unchanged() {
        assert_eq!(send(test_app(), "/").await, StatusCode::OK);
        assert_eq!(send(test_app(), "/weather").await, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_framework_404_still_reaches_client() {
        // The middleware wraps responses produced without any handler too
        assert_eq!(send(test_app(), "/no-such-route").await, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_requests_land_in_recorder_with_bounded_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        // Thread-local recorder plus a current-thread runtime keeps the
        // whole request on the thread the recorder is bound to
        metrics::with_local_recorder(&recorder, || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                assert_eq!(send(test_app(), "/weather").await, StatusCode::BAD_GATEWAY);
                assert_eq!(
                    send(test_app(), "/probe/from/a/scanner").await,
                    StatusCode::NOT_FOUND
                );
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains("relay_http_requests_total"));
        assert!(rendered.contains("endpoint=\"/weather\""));
        // Unknown paths collapse instead of minting new label values
        assert!(rendered.contains("endpoint=\"/other\""));
        assert!(!rendered.contains("scanner"));
    }
}
