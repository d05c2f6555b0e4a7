//! Core library for the clinic form submission server: validation, sanitization,
//! sheet storage and the HTTP surface that ties them together.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod sheets;
pub mod validation;

pub use config::AppConfig;
pub use error::{AppError, Result, SinkError};
pub use handlers::{create_routes, SUBMIT_FORM_PATH};
pub use middleware::{cors_middleware, CorsPolicy};
pub use models::{FormType, MessageResponse, SubmissionEnvelope};
pub use services::{SubmissionOutcome, SubmissionService};
pub use sheets::{GoogleSheetsSink, MemorySheetSink, TableSink};
pub use validation::{sanitize, validate, ValidationResult};

use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, Router};
use chrono::FixedOffset;
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub submissions: SubmissionService,
    pub cors: CorsPolicy,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// A `None` sink puts the service in mock mode.
    pub fn new(config: &AppConfig, sink: Option<Arc<dyn TableSink>>) -> Result<Self> {
        let offset_minutes = config.submission.utc_offset_minutes;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| {
            AppError::Configuration(format!("utc_offset_minutes out of range: {}", offset_minutes))
        })?;

        Ok(Self {
            app_name: "Clinic Form Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            submissions: SubmissionService::new(sink, utc_offset),
            cors: CorsPolicy::from_config(&config.cors),
            body_limit_bytes: config.server.body_limit_bytes,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn TableSink>) -> Self {
        self.submissions = SubmissionService::with_sink(sink, self.submissions.utc_offset());
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let router = create_routes()
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(axum_middleware::from_fn_with_state(
            state.cors.clone(),
            cors_middleware,
        ));

    middleware::with_request_tracing(router).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
