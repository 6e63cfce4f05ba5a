use crate::utils::error::{Result, SyncError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> SyncError {
    SyncError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Base URL of the TestOps server or the Sheets API.
///
/// Request paths such as `/api/uaa/oauth/token` or
/// `/v4/spreadsheets/{id}/values/...` are appended to it, so a query string
/// or fragment would end up in the middle of every request URL.
pub fn validate_service_base(field_name: &str, base: &str) -> Result<()> {
    if base.trim().is_empty() {
        return Err(SyncError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    let url = Url::parse(base).map_err(|e| {
        invalid(
            field_name,
            base,
            format!("expected an address like https://testops.example.com ({})", e),
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            base,
            format!("API calls go over http or https, not {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field_name, base, "no host in the address"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            base,
            "API paths are appended to this address; drop the ?query or #fragment",
        ));
    }
    Ok(())
}

/// Path of the service account JSON key. Whether the file exists is checked
/// when the key is loaded; a directory is rejected here.
pub fn validate_credentials_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(SyncError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "path contains null bytes"));
    }
    if Path::new(path).is_dir() {
        return Err(invalid(
            field_name,
            path,
            "points at a directory, expected the service account JSON key file",
        ));
    }
    Ok(())
}

pub fn validate_at_least(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("must be at least {}", min_value),
        ));
    }
    Ok(())
}

/// 必填欄位：空字串視為未設定
pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "cannot be empty or whitespace-only"));
    }
    Ok(())
}
