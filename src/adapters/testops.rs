use crate::config::TestOpsSettings;
use crate::domain::model::{AccessToken, CaseId, NormalizedStatus};
use crate::domain::ports::ResultSource;
use crate::domain::services::normalize;
use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryPage {
    #[serde(default)]
    content: Option<Vec<HistoryEntry>>,
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    #[serde(default)]
    status: Option<String>,
}

/// TestOps REST client: password-grant login and per-case run history.
pub struct TestOpsClient {
    client: Client,
    settings: TestOpsSettings,
}

impl TestOpsClient {
    pub fn new(settings: TestOpsSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout()).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl ResultSource for TestOpsClient {
    async fn authenticate(&self) -> Result<AccessToken> {
        if self.settings.username.is_empty() || self.settings.password.is_empty() {
            return Err(SyncError::AuthError {
                message: "username and password are required".to_string(),
            });
        }

        let url = self.endpoint("/api/uaa/oauth/token");
        tracing::debug!("Requesting TestOps token from {}", url);

        let form = [
            ("grant_type", "password"),
            ("username", self.settings.username.as_str()),
            ("password", self.settings.password.as_str()),
            ("client_id", self.settings.client_id.as_str()),
            ("scope", self.settings.scope.as_str()),
        ];
        let response = self.client.post(&url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::AuthError {
                message: format!("token endpoint returned HTTP {}: {}", status.as_u16(), body),
            });
        }

        let body: TokenResponse = response.json().await?;
        match body.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(SyncError::AuthError {
                message: "no access_token in response".to_string(),
            }),
        }
    }

    async fn fetch_last_status(
        &self,
        case_id: &CaseId,
        token: &AccessToken,
    ) -> Result<NormalizedStatus> {
        let url = self.endpoint(&format!("/api/testcase/{}/history", case_id));

        let response = self
            .client
            .get(&url)
            .query(&[("page", "0"), ("size", "1")])
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .send()
            .await
            .map_err(|e| SyncError::CaseFetchError {
                case_id: case_id.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        tracing::debug!("History for #{}: HTTP {}", case_id, status);
        if !status.is_success() {
            return Err(SyncError::HttpStatusError {
                url,
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("request failed").to_string(),
            });
        }

        let page: HistoryPage = response.json().await.map_err(|e| SyncError::CaseFetchError {
            case_id: case_id.to_string(),
            message: format!("invalid history payload: {}", e),
        })?;

        // 沒有任何執行紀錄
        let Some(latest) = page.content.unwrap_or_default().into_iter().next() else {
            return Ok(NormalizedStatus::NoResult);
        };

        let raw = latest.status.unwrap_or_else(|| "UNKNOWN".to_string());
        Ok(normalize(&raw))
    }
}
