use crate::adapters::google_auth::{fetch_access_token, ServiceAccountKey, SHEETS_SCOPE};
use crate::config::SheetSettings;
use crate::domain::model::{AccessToken, WriteSummary};
use crate::domain::ports::{SheetLayout, SheetStore};
use crate::utils::error::{Result, SyncError};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

/// Google Sheets v4 `values` endpoints for one spreadsheet.
pub struct SheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    token: AccessToken,
    layout: SheetLayout,
}

impl SheetsClient {
    /// 讀取服務帳戶金鑰並取得 token
    pub async fn connect(settings: &SheetSettings, timeout: Duration) -> Result<Self> {
        let key = ServiceAccountKey::from_file(&settings.credentials_path)?;
        let client = Client::builder().timeout(timeout).build()?;
        let token = fetch_access_token(&client, &key, SHEETS_SCOPE).await?;

        tracing::debug!("Connected to Google Sheets as {}", key.client_email);
        Ok(Self::from_parts(client, settings, token))
    }

    pub fn with_token(settings: &SheetSettings, token: AccessToken, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_parts(client, settings, token))
    }

    fn from_parts(client: Client, settings: &SheetSettings, token: AccessToken) -> Self {
        Self {
            client,
            api_base: settings.api_base.clone(),
            spreadsheet_id: settings.spreadsheet_id.clone(),
            token,
            layout: settings.layout(),
        }
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base).map_err(|e| SyncError::ConfigError {
            message: format!("invalid Sheets API base '{}': {}", self.api_base, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| SyncError::ConfigError {
                message: format!("Sheets API base '{}' cannot hold a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);

        Ok(url)
    }

    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::SheetsError {
            message: format!("{} failed with HTTP {}: {}", action, status.as_u16(), body),
        })
    }
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SheetStore for SheetsClient {
    fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    async fn read_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range)?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.token.bearer())
            .send()
            .await?;
        let response = Self::check(response, "reading values").await?;

        let body: ValueRange = response.json().await?;
        let rows = body
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();

        Ok(rows)
    }

    async fn update_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<WriteSummary> {
        let url = self.values_url(range)?;
        tracing::debug!("PUT {} ({} rows)", url, values.len());

        let body = serde_json::json!({
            "majorDimension": "ROWS",
            "values": values,
        });
        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .header(reqwest::header::AUTHORIZATION, self.token.bearer())
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response, "updating values").await?;

        Ok(response.json().await?)
    }
}
