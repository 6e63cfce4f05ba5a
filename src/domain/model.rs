use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// 測試案例編號：只允許純數字
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseId(String);

impl CaseId {
    /// Parses a column A cell such as `101` or `102:expected-fail`.
    ///
    /// Returns `None` for blank cells, `#` comments and anything whose leading
    /// `:`-separated token is not made of ASCII digits.
    pub fn from_cell(cell: &str) -> Option<Self> {
        let raw = cell.trim();
        if raw.is_empty() || raw.starts_with('#') {
            return None;
        }

        let token = raw.split(':').next().unwrap_or("").trim();
        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            Some(Self(token.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NormalizedStatus {
    Passed,
    Failed,
    Skipped,
    NoResult,
    /// 其他狀態原樣 (大寫) 保留
    Other(String),
}

impl NormalizedStatus {
    pub fn as_str(&self) -> &str {
        match self {
            NormalizedStatus::Passed => "PASSED",
            NormalizedStatus::Failed => "FAILED",
            NormalizedStatus::Skipped => "SKIPPED",
            NormalizedStatus::NoResult => "NO_RESULT",
            NormalizedStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for NormalizedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// Outcome of one case lookup. `Err` carries the diagnostic shown in the sheet.
pub type StatusOutcome = std::result::Result<NormalizedStatus, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    /// 0-based position among the extracted ids
    pub position: usize,
    pub case_id: CaseId,
    pub outcome: StatusOutcome,
}

impl StatusRow {
    /// Renders the value written to the status column. Diagnostics are cut to
    /// `max_marker_len` characters.
    pub fn cell_value(&self, max_marker_len: usize) -> String {
        match &self.outcome {
            Ok(status) => status.to_string(),
            Err(message) => format!("ERROR: {}", message)
                .chars()
                .take(max_marker_len)
                .collect(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Google Sheets `UpdateValuesResponse`; empty when nothing was written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteSummary {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub case_count: usize,
    pub error_count: usize,
    pub tally: BTreeMap<String, usize>,
    pub write: WriteSummary,
}

impl SyncReport {
    pub fn from_rows(rows: &[StatusRow], write: WriteSummary) -> Self {
        let mut tally = BTreeMap::new();
        let mut error_count = 0;
        for row in rows {
            match &row.outcome {
                Ok(status) => *tally.entry(status.to_string()).or_insert(0) += 1,
                Err(_) => error_count += 1,
            }
        }

        Self {
            case_count: rows.len(),
            error_count,
            tally,
            write,
        }
    }
}
