//! Form submission endpoint

use crate::{
    error::{AppError, Result},
    models::{Fields, MessageResponse, SubmissionEnvelope},
    services::SUCCESS_MESSAGE,
    validation::{validate, INVALID_REQUEST_DATA},
    AppState,
};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, warn};

/// Accepts every method so that the preflight and 405 policy live here rather
/// than in the router.
pub async fn handle_submit(
    State(state): State<AppState>,
    method: Method,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    // Oversized or unreadable bodies get the same generic failure as bad JSON.
    let body = body.map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
    let envelope = SubmissionEnvelope::from_slice(&body)?;

    if envelope.is_honeypot_triggered() {
        warn!("Honeypot field filled, silently accepting submission");
        return Ok(message(SUCCESS_MESSAGE));
    }

    let form_type = envelope.form_type()?;

    let validation = validate(form_type, envelope.data.as_ref());
    if !validation.is_valid() {
        debug!(
            form_type = %form_type,
            errors = ?validation.errors(),
            "Submission failed validation"
        );
        return Err(AppError::Validation(validation.into_errors()));
    }

    let fields = envelope
        .fields()
        .map(Fields::new)
        .ok_or_else(|| AppError::Validation(vec![INVALID_REQUEST_DATA.to_string()]))?;

    let outcome = state.submissions.submit(form_type, fields).await?;

    Ok(message(outcome.message()))
}

fn message(text: &str) -> Response {
    (StatusCode::OK, Json(MessageResponse::new(text))).into_response()
}
