use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

pub const GOOGLE_SERVICE_ACCOUNT_EMAIL_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const GOOGLE_PRIVATE_KEY_VAR: &str = "GOOGLE_PRIVATE_KEY";
pub const GOOGLE_SHEET_ID_VAR: &str = "GOOGLE_SHEET_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub sheets: SheetsConfig,
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    pub host: String,
    #[validate(range(min = 1, message = "Server port cannot be 0"))]
    pub port: u16,
    #[validate(range(min = 1024, message = "Request body limit must be at least 1KB"))]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CorsConfig {
    /// The first entry is the fallback origin for unknown or missing `Origin` headers.
    #[validate(length(min = 1, message = "At least one allowed origin is required"))]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SheetsConfig {
    pub service_account_email: Option<String>,
    pub private_key: Option<String>,
    pub sheet_id: Option<String>,
    pub api_base_url: String,
    pub token_url: String,
    #[validate(range(min = 1, message = "Sheets request timeout must be greater than 0"))]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmissionConfig {
    /// Offset applied to the "Submitted At" column. Asia/Kolkata has no DST.
    #[validate(range(
        min = -720,
        max = 840,
        message = "UTC offset must be within -12:00 and +14:00"
    ))]
    pub utc_offset_minutes: i32,
}

/// Service account material needed to talk to the spreadsheet API.
#[derive(Clone)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub sheet_id: Option<String>,
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("sheet_id", &self.sheet_id)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            sheets: SheetsConfig::default(),
            submission: SubmissionConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            body_limit_bytes: 64 * 1024,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://drdeepikagyno.com".to_string(),
                "https://www.drdeepikagyno.com".to_string(),
                "http://localhost:8888".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            service_account_email: None,
            private_key: None,
            sheet_id: None,
            api_base_url: "https://sheets.googleapis.com/v4/spreadsheets/".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
        }
    }
}

impl SheetsConfig {
    /// Returns credentials only when both the account email and the key are set.
    /// The key usually arrives with literal `\n` sequences from the environment.
    pub fn credentials(&self) -> Option<ServiceAccountCredentials> {
        let client_email = non_empty(self.service_account_email.as_deref())?;
        let private_key = non_empty(self.private_key.as_deref())?;

        Some(ServiceAccountCredentials {
            client_email: client_email.to_string(),
            private_key: private_key.replace("\\n", "\n"),
            sheet_id: non_empty(self.sheet_id.as_deref()).map(str::to_string),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .set_override_option(
                "sheets.service_account_email",
                std::env::var(GOOGLE_SERVICE_ACCOUNT_EMAIL_VAR).ok(),
            )?
            .set_override_option(
                "sheets.private_key",
                std::env::var(GOOGLE_PRIVATE_KEY_VAR).ok(),
            )?
            .set_override_option("sheets.sheet_id", std::env::var(GOOGLE_SHEET_ID_VAR).ok())?;

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate().map_err(invalid)?;
        self.cors.validate().map_err(invalid)?;
        self.sheets.validate().map_err(invalid)?;
        self.submission.validate().map_err(invalid)?;

        if self.server.host.is_empty() {
            return Err(ConfigError::Message("Server host cannot be empty".to_string()));
        }

        if self.cors.allowed_origins.iter().any(|origin| origin.trim().is_empty()) {
            return Err(ConfigError::Message(
                "Allowed origins cannot contain empty entries".to_string(),
            ));
        }

        if self.sheets.credentials().is_some() && self.sheets.sheet_id.is_none() {
            tracing::warn!("Sheets credentials are set but no sheet id is configured");
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn invalid(errors: validator::ValidationErrors) -> ConfigError {
    ConfigError::Message(errors.to_string())
}
