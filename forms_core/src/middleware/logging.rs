//! Request tracing layer

use axum::{body::Body, Router};
use http::{Request, Response, StatusCode};
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::trace::TraceLayer;
use tracing::{info_span, Level, Span};

/// Wraps `router` in a trace layer that logs one span per request and grades
/// the outcome by status class.
pub fn with_request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let origin = request
                .headers()
                .get(http::header::ORIGIN)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-")
                .to_string();

            info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
                origin = %origin,
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::debug!("started {} {}", request.method(), request.uri().path());
        })
        .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
            let status = response.status();
            let latency_ms = latency.as_millis();

            let level = response_level(status);
            if level == Level::ERROR {
                tracing::error!(status = status.as_u16(), latency_ms, "server error response");
            } else if level == Level::WARN {
                tracing::warn!(status = status.as_u16(), latency_ms, "client error response");
            } else {
                tracing::info!(status = status.as_u16(), latency_ms, "request completed");
            }
        })
        .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
            tracing::error!(latency_ms = latency.as_millis(), error = ?error, "request failed");
        });

    router.layer(layer)
}

/// 5xx is an error, 4xx a warning, everything else informational.
fn response_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_level_by_status_class() {
        assert_eq!(response_level(StatusCode::OK), Level::INFO);
        assert_eq!(response_level(StatusCode::NO_CONTENT), Level::INFO);
        assert_eq!(response_level(StatusCode::SWITCHING_PROTOCOLS), Level::INFO);
        assert_eq!(response_level(StatusCode::MOVED_PERMANENTLY), Level::INFO);
        assert_eq!(response_level(StatusCode::METHOD_NOT_ALLOWED), Level::WARN);
        assert_eq!(response_level(StatusCode::INTERNAL_SERVER_ERROR), Level::ERROR);
    }
}
