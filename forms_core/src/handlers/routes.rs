use super::{health::handle_health, submit::handle_submit};
use crate::AppState;
use axum::{
    routing::{any, get},
    Router,
};

pub const SUBMIT_FORM_PATH: &str = "/api/submit-form";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .route(SUBMIT_FORM_PATH, any(handle_submit))
}
