//! Google Sheets backed table sink (service account + Sheets v4 REST API)

use super::{SheetRow, TableSink};
use crate::config::{ServiceAccountCredentials, SheetsConfig};
use crate::error::SinkError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECONDS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECONDS: i64 = 60;

#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECONDS
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct GoogleSheetsSink {
    client: Client,
    credentials: ServiceAccountCredentials,
    api_base_url: Url,
    token_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsSink {
    pub fn new(
        credentials: ServiceAccountCredentials,
        config: &SheetsConfig,
    ) -> Result<Self, SinkError> {
        let api_base_url = Url::parse(&config.api_base_url)
            .map_err(|e| SinkError::Configuration(format!("Invalid sheets api url: {}", e)))?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            credentials,
            api_base_url,
            token_url: config.token_url.clone(),
            token: Mutex::new(None),
        })
    }

    fn sheet_id(&self) -> Result<&str, SinkError> {
        self.credentials
            .sheet_id
            .as_deref()
            .ok_or_else(|| SinkError::Configuration("GOOGLE_SHEET_ID is not set".to_string()))
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, SinkError> {
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| SinkError::Authentication(format!("Invalid private key: {}", e)))?;

        let claims = ServiceAccountClaims {
            iss: &self.credentials.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_url,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECONDS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| SinkError::Authentication(format!("Failed to sign assertion: {}", e)))
    }

    async fn access_token(&self) -> Result<String, SinkError> {
        let now = Utc::now();

        let cached = self.token.lock().clone();
        if let Some(cached) = cached.filter(|token| token.expires_at > now) {
            return Ok(cached.value);
        }

        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| SinkError::Authentication(format!("Token request failed: {}", e)))?;

        let token: TokenResponse = ensure_success(response)
            .await
            .map_err(|e| SinkError::Authentication(e.to_string()))?
            .json()
            .await?;

        debug!(expires_in = token.expires_in, "Obtained sheets access token");

        let expires_at = now + Duration::seconds(token.expires_in - TOKEN_REFRESH_MARGIN_SECONDS);
        *self.token.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SinkError> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SinkError::Configuration("Sheets api url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn sheet_titles(&self, token: &str) -> Result<Vec<String>, SinkError> {
        let url = self.url(&[self.sheet_id()?])?;
        let response = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties.title")])
            .bearer_auth(token)
            .send()
            .await?;

        let metadata: SpreadsheetMetadata = ensure_success(response).await?.json().await?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    async fn add_sheet(&self, token: &str, name: &str) -> Result<(), SinkError> {
        let batch_update = format!("{}:batchUpdate", self.sheet_id()?);
        let url = self.url(&[&batch_update])?;
        let body = json!({
            "requests": [{ "addSheet": { "properties": { "title": name } } }]
        });

        let response = self.client.post(url).bearer_auth(token).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn header_row(&self, token: &str, name: &str) -> Result<Vec<String>, SinkError> {
        let url = self.url(&[self.sheet_id()?, "values", &a1_range(name, "1:1")])?;
        let response = self.client.get(url).bearer_auth(token).send().await?;

        let range: ValueRange = ensure_success(response).await?.json().await?;
        Ok(first_row_as_text(range))
    }

    async fn write_header_row(
        &self,
        token: &str,
        name: &str,
        headers: &[&str],
    ) -> Result<(), SinkError> {
        let url = self.url(&[self.sheet_id()?, "values", &a1_range(name, "A1")])?;
        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(token)
            .json(&json!({ "values": [headers] }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TableSink for GoogleSheetsSink {
    async fn ensure_schema(&self, name: &str, headers: &[&str]) -> Result<(), SinkError> {
        let token = self.access_token().await?;
        let titles = self.sheet_titles(&token).await?;

        if !titles.iter().any(|title| title == name) {
            info!(sheet = name, "Creating sheet");
            self.add_sheet(&token, name).await?;
            return self.write_header_row(&token, name, headers).await;
        }

        if self.header_row(&token, name).await?.is_empty() {
            info!(sheet = name, "No header row found, creating one");
            self.write_header_row(&token, name, headers).await?;
        }

        Ok(())
    }

    async fn append_row(&self, name: &str, row: &SheetRow) -> Result<(), SinkError> {
        let token = self.access_token().await?;
        let headers = self.header_row(&token, name).await?;
        let values = row.values_for(&headers);

        let append = format!("{}:append", a1_range(name, "A1"));
        let url = self.url(&[self.sheet_id()?, "values", &append])?;
        let response = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&token)
            .json(&json!({ "values": [values] }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "google-sheets"
    }
}

async fn ensure_success(response: Response) -> Result<Response, SinkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SinkError::Response(format!("{}: {}", status, body)))
}

/// `'My Sheet'!A1` style reference; single quotes inside the title are doubled.
fn a1_range(sheet: &str, range: &str) -> String {
    format!("'{}'!{}", sheet.replace('\'', "''"), range)
}

fn first_row_as_text(range: ValueRange) -> Vec<String> {
    range
        .values
        .into_iter()
        .next()
        .unwrap_or_default()
        .into_iter()
        .map(|cell| match cell {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .take_while(|header| !header.is_empty())
        .collect()
}
