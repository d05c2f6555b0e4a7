//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// The only message a caller ever sees for server-side failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid form type.")]
    InvalidFormType,

    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures raised by a [`crate::sheets::TableSink`] implementation.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Spreadsheet request failed: {0}")]
    Request(String),

    #[error("Unexpected spreadsheet response: {0}")]
    Response(String),

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Request(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidFormType | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::InvalidFormType | AppError::Validation(_) | AppError::MethodNotAllowed => {
                self.to_string()
            }
            AppError::MalformedBody(detail) => {
                tracing::error!("Failed to parse submission body: {}", detail);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            AppError::Sink(err) => {
                tracing::error!("Sink error: {:?}", err);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            AppError::JsonError(err) => {
                tracing::error!("JSON error: {:?}", err);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            AppError::IoError(err) => {
                tracing::error!("IO error: {:?}", err);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_space_joined() {
        let err = AppError::Validation(vec![
            "Name is required (minimum 2 characters).".to_string(),
            "A valid email address is required.".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Name is required (minimum 2 characters). A valid email address is required."
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidFormType.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            AppError::Sink(SinkError::Request("timeout".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::MalformedBody("EOF".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
