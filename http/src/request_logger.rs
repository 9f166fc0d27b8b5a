//! Structured request logging middleware
//!
//! Logs one line per request with method, path, status, and elapsed time.
//! Successful and client-error responses go to the info channel; server
//! errors are raised on the error channel so they land in the error log.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Request logging middleware; wraps every route on the router
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            "Request failed"
        );
    } else {
        tracing::info!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms,
            "Request handled"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::StatusCode,
        middleware,
        routing::get,
        Router,
    };
    use tower::util::ServiceExt;

    fn logged_router() -> Router {
        Router::new()
            .route("/ok", get(|| async { StatusCode::OK }))
            .route(
                "/broken",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .layer(middleware::from_fn(request_logging_middleware))
    }

    #[tokio::test]
    async fn test_middleware_passes_success_through() {
        let request = Request::builder()
            .uri("/ok")
            .body(Body::empty())
            .expect("request should build");

        let response = logged_router().oneshot(request).await.expect("router ran");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_passes_server_error_through() {
        let request = Request::builder()
            .uri("/broken")
            .body(Body::empty())
            .expect("request should build");

        let response = logged_router().oneshot(request).await.expect("router ran");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
