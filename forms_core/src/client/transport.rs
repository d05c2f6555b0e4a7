//! How the form controller reaches the submission endpoint

use crate::models::FormType;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Wire body of a submission: `{ "type": ..., "data": {...} }`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmissionRequest {
    #[serde(rename = "type")]
    pub form_type: FormType,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|value| value.contains("application/json"))
            .unwrap_or(false)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn send(&self, request: &SubmissionRequest) -> Result<TransportResponse, TransportError>;
}

/// Posts JSON to the endpoint over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn send(&self, request: &SubmissionRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
