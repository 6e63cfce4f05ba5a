use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Token signing error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("HTTP {status} from {url}: {message}")]
    HttpStatusError {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Spreadsheet error: {message}")]
    SheetsError { message: String },

    #[error("Case #{case_id}: {message}")]
    CaseFetchError { case_id: String, message: String },

    #[error("No test case ids found in column A of tab '{tab}'")]
    NoCaseIdsError { tab: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Authentication,
    Transport,
    Data,
    System,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ConfigError { .. }
            | SyncError::MissingConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SyncError::AuthError { .. } | SyncError::TokenError(_) => {
                ErrorCategory::Authentication
            }
            SyncError::ApiError(_)
            | SyncError::HttpStatusError { .. }
            | SyncError::SheetsError { .. }
            | SyncError::CaseFetchError { .. } => ErrorCategory::Transport,
            SyncError::SerializationError(_) | SyncError::NoCaseIdsError { .. } => {
                ErrorCategory::Data
            }
            SyncError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Set GOOGLE_SHEET_ID, TESTOPS_USERNAME and TESTOPS_PASSWORD in the environment or the config file"
            }
            ErrorCategory::Authentication => {
                "Check the TestOps credentials and the service account key file"
            }
            ErrorCategory::Transport => {
                "Check network access to TestOps and Google Sheets, then run again"
            }
            ErrorCategory::Data => match self {
                SyncError::NoCaseIdsError { .. } => {
                    "Put numeric test case ids into column A (one per row, '#' starts a comment)"
                }
                _ => "The remote service returned an unexpected payload",
            },
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::MissingConfigError { field } => {
                format!("Required setting {} is not set", field)
            }
            SyncError::NoCaseIdsError { tab } => {
                format!("Column A of tab '{}' contains no test case ids", tab)
            }
            SyncError::AuthError { message } => format!("TestOps login failed: {}", message),
            other => other.to_string(),
        }
    }

    /// 所有致命錯誤都以 1 結束程序
    pub fn exit_code(&self) -> i32 {
        1
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let missing = SyncError::MissingConfigError {
            field: "GOOGLE_SHEET_ID".to_string(),
        };
        assert_eq!(missing.category(), ErrorCategory::Configuration);
        assert!(missing.user_friendly_message().contains("GOOGLE_SHEET_ID"));

        let auth = SyncError::AuthError {
            message: "no access_token in response".to_string(),
        };
        assert_eq!(auth.category(), ErrorCategory::Authentication);

        let empty = SyncError::NoCaseIdsError {
            tab: "TC_STATUS".to_string(),
        };
        assert_eq!(empty.category(), ErrorCategory::Data);
        assert!(empty.recovery_suggestion().contains("column A"));
    }

    #[test]
    fn test_fatal_errors_exit_with_one() {
        let errors = [
            SyncError::ConfigError {
                message: "bad".to_string(),
            },
            SyncError::AuthError {
                message: "denied".to_string(),
            },
            SyncError::NoCaseIdsError {
                tab: "TC_STATUS".to_string(),
            },
        ];
        for e in errors {
            assert_eq!(e.exit_code(), 1);
        }
    }
}
