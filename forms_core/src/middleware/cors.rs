//! Allow-list CORS policy with a fallback origin

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, ORIGIN},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::CorsConfig;

/// Static allow-list shared by all requests.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Arc<[String]>,
}

/// The origin echoed back for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allow_origin: String,
    pub matched: bool,
}

impl CorsPolicy {
    /// `allowed_origins` must not be empty; its first entry is the fallback.
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins: allowed_origins.into(),
        }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        Self::new(config.allowed_origins.clone())
    }

    pub fn primary_origin(&self) -> &str {
        self.allowed_origins.first().map(String::as_str).unwrap_or_default()
    }

    pub fn decide(&self, origin: Option<&str>) -> CorsDecision {
        let allowed = |origin: &str| self.allowed_origins.iter().any(|entry| entry == origin);

        match origin {
            Some(origin) if allowed(origin) => CorsDecision {
                allow_origin: origin.to_string(),
                matched: true,
            },
            _ => CorsDecision {
                allow_origin: self.primary_origin().to_string(),
                matched: false,
            },
        }
    }

    pub fn decide_for(&self, headers: &HeaderMap) -> CorsDecision {
        let origin = headers.get(ORIGIN).and_then(|value| value.to_str().ok());
        self.decide(origin)
    }
}

impl CorsDecision {
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.allow_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("content-type"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
}

pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let decision = policy.decide_for(request.headers());
    if !decision.matched {
        debug!(fallback = %decision.allow_origin, "Origin not in allow-list");
    }

    let mut response = next.run(request).await;
    decision.apply(response.headers_mut());
    response
}
