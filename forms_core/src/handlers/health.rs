use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

pub async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "app": state.app_name,
        "version": state.version,
        "sink": state.submissions.sink_name(),
        "connected": state.submissions.is_connected(),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}
