//! Main entry point for the form submission server binary

use anyhow::Result;
use forms_core::{create_app, run_server, AppConfig, AppState, GoogleSheetsSink, TableSink};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());
    info!("Allowed origins: {:?}", config.cors.allowed_origins);

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let sink: Option<Arc<dyn TableSink>> = match config.sheets.credentials() {
        Some(credentials) => {
            let sink = GoogleSheetsSink::new(credentials, &config.sheets)
                .map_err(|e| anyhow::anyhow!("Failed to initialize sheets client: {}", e))?;
            info!("Google Sheets sink initialized");
            Some(Arc::new(sink))
        }
        None => {
            warn!("Sheet credentials missing, submissions are acknowledged but not stored");
            None
        }
    };

    let state = AppState::new(&config, sink)?;
    let app = create_app(state);

    run_server(app, addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!(
                "{}={},forms_core={},tower_http=debug",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                default_level,
                default_level
            ).into()
        });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
