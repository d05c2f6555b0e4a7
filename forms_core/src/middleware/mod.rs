//! Middleware components for the form server

pub mod cors;
pub mod logging;

pub use cors::{cors_middleware, CorsDecision, CorsPolicy};
pub use logging::with_request_tracing;
