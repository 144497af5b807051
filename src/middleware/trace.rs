//! Request tracing middleware

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Log each request with its timing inside a span carrying a request id
///
/// An incoming `X-Request-Id` is reused; otherwise a fresh UUID is assigned.
/// The id is echoed on the response.
pub async fn request_tracing(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("request", request_id = %request_id, method = %method, path = %path);

    let start = Instant::now();
    let mut response = async move {
        tracing::debug!("Request started");
        next.run(request).await
    }
    .instrument(span.clone())
    .await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    span.in_scope(|| {
        if response.status().is_server_error() {
            tracing::error!(status, duration_ms, "Request completed with error");
        } else if response.status().is_client_error() {
            tracing::warn!(status, duration_ms, "Request completed with client error");
        } else {
            tracing::info!(status, duration_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn(request_tracing))
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let response = app()
            .oneshot(axum::http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");
    }
}
