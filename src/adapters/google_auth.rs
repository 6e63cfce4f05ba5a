use crate::domain::model::AccessToken;
use crate::utils::error::{Result, SyncError};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service account JSON key that the token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SyncError::ConfigError {
                message: format!("credentials file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(content)?;
        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(SyncError::ConfigError {
                message: "service account key lacks client_email or private_key".to_string(),
            });
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JwtClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(key: &ServiceAccountKey, scope: &str, issued_at: i64) -> Self {
        Self {
            iss: key.client_email.clone(),
            scope: scope.to_string(),
            aud: key.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// RS256 JWT assertion signed with the service account's private key.
pub fn sign_assertion(key: &ServiceAccountKey, scope: &str, issued_at: i64) -> Result<String> {
    let claims = JwtClaims::new(key, scope, issued_at);
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &signing_key,
    )?)
}

/// 以服務帳戶簽署 JWT，換取 Sheets API 的 access token
pub async fn fetch_access_token(
    client: &Client,
    key: &ServiceAccountKey,
    scope: &str,
) -> Result<AccessToken> {
    let assertion = sign_assertion(key, scope, chrono::Utc::now().timestamp())?;

    tracing::debug!("Exchanging service account assertion for {}", key.client_email);
    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SyncError::AuthError {
            message: format!("Google token endpoint returned HTTP {}: {}", status.as_u16(), body),
        });
    }

    let body: GoogleTokenResponse = response.json().await?;
    body.access_token
        .filter(|t| !t.is_empty())
        .map(AccessToken::new)
        .ok_or_else(|| SyncError::AuthError {
            message: "Google token response has no access_token".to_string(),
        })
}
