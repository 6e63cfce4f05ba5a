#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliArgs;

use crate::domain::ports::SheetLayout;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_at_least, validate_credentials_path, validate_non_empty_string, validate_required,
    validate_service_base, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_SHEET_ID: &str = "GOOGLE_SHEET_ID";
pub const ENV_CREDENTIALS_PATH: &str = "GOOGLE_CREDENTIALS_PATH";
pub const ENV_TESTOPS_URL: &str = "TESTOPS_URL";
pub const ENV_TESTOPS_USERNAME: &str = "TESTOPS_USERNAME";
pub const ENV_TESTOPS_PASSWORD: &str = "TESTOPS_PASSWORD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub sheet: SheetSettings,
    #[serde(default)]
    pub testops: TestOpsSettings,
    #[serde(default)]
    pub run: RunSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSettings {
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    #[serde(default = "default_tab")]
    pub tab: String,
    #[serde(default = "default_id_range")]
    pub id_range: String,
    #[serde(default = "default_status_anchor")]
    pub status_anchor: String,
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TestOpsSettings {
    #[serde(default = "default_testops_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default = "default_error_marker_len")]
    pub error_marker_len: usize,
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_tab() -> String {
    "TC_STATUS".to_string()
}

fn default_id_range() -> String {
    "A1:A1000".to_string()
}

fn default_status_anchor() -> String {
    "B1".to_string()
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_testops_url() -> String {
    "https://vengacrypto.testops.cloud".to_string()
}

fn default_client_id() -> String {
    "api".to_string()
}

fn default_scope() -> String {
    "openid".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_request_delay_ms() -> u64 {
    100
}

fn default_error_marker_len() -> usize {
    50
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            credentials_path: default_credentials_path(),
            tab: default_tab(),
            id_range: default_id_range(),
            status_anchor: default_status_anchor(),
            api_base: default_sheets_api_base(),
        }
    }
}

impl SheetSettings {
    pub fn layout(&self) -> SheetLayout {
        SheetLayout::new(&self.tab, &self.id_range, &self.status_anchor)
    }
}

impl Default for TestOpsSettings {
    fn default() -> Self {
        Self {
            base_url: default_testops_url(),
            username: String::new(),
            password: String::new(),
            client_id: default_client_id(),
            scope: default_scope(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl TestOpsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// 密碼不寫進日誌
impl std::fmt::Debug for TestOpsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestOpsSettings")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("client_id", &self.client_id)
            .field("scope", &self.scope)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            error_marker_len: default_error_marker_len(),
        }
    }
}

impl RunSettings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// Loads `.env` into the process environment without overriding variables
/// that are already set. `None` searches the working directory and its parents.
pub fn load_dotenv(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(path) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Some(path)
        }
        // 沒有 .env 檔是正常情況
        Err(e) if e.not_found() => None,
        Err(e) => {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
            None
        }
    }
}

impl SyncConfig {
    /// 從環境變數載入配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_overrides(lookup);
        config
    }

    /// 從 TOML 檔案載入配置，環境變數優先
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SyncError::ConfigError {
            message: format!(
                "cannot read config file {}: {}",
                path.as_ref().display(),
                e
            ),
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TESTOPS_PASSWORD})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SHEET_ID) {
            self.sheet.spreadsheet_id = v;
        }
        if let Some(v) = get(ENV_CREDENTIALS_PATH) {
            self.sheet.credentials_path = v;
        }
        if let Some(v) = get(ENV_TESTOPS_URL) {
            self.testops.base_url = v;
        }
        if let Some(v) = get(ENV_TESTOPS_USERNAME) {
            self.testops.username = v;
        }
        if let Some(v) = get(ENV_TESTOPS_PASSWORD) {
            self.testops.password = v;
        }
    }

    /// Only the spreadsheet half; used by tools that never talk to TestOps.
    pub fn validate_sheet(&self) -> Result<()> {
        validate_required(ENV_SHEET_ID, &self.sheet.spreadsheet_id)?;
        validate_credentials_path(ENV_CREDENTIALS_PATH, &self.sheet.credentials_path)?;
        validate_service_base("sheet.api_base", &self.sheet.api_base)?;
        validate_non_empty_string("sheet.tab", &self.sheet.tab)?;
        validate_non_empty_string("sheet.id_range", &self.sheet.id_range)?;
        validate_non_empty_string("sheet.status_anchor", &self.sheet.status_anchor)?;
        Ok(())
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_sheet()?;

        validate_service_base(ENV_TESTOPS_URL, &self.testops.base_url)?;
        validate_required(ENV_TESTOPS_USERNAME, &self.testops.username)?;
        validate_required(ENV_TESTOPS_PASSWORD, &self.testops.password)?;
        validate_at_least(
            "testops.timeout_seconds",
            self.testops.timeout_seconds as usize,
            1,
        )?;
        // "ERROR: " 前綴本身就佔 7 個字元
        validate_at_least("run.error_marker_len", self.run.error_marker_len, 8)?;

        Ok(())
    }
}
