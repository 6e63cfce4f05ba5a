use crate::domain::model::{AccessToken, CaseId, NormalizedStatus, StatusRow, WriteSummary};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where ids are read from and statuses are written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    pub tab: String,
    pub id_range: String,
    pub status_anchor: String,
}

impl SheetLayout {
    pub fn new(
        tab: impl Into<String>,
        id_range: impl Into<String>,
        status_anchor: impl Into<String>,
    ) -> Self {
        Self {
            tab: tab.into(),
            id_range: id_range.into(),
            status_anchor: status_anchor.into(),
        }
    }

    /// A1 notation with a quoted tab name, e.g. `'TC_STATUS'!A1:A1000`.
    pub fn qualified(&self, cells: &str) -> String {
        format!("'{}'!{}", self.tab.replace('\'', "''"), cells)
    }

    pub fn id_range(&self) -> String {
        self.qualified(&self.id_range)
    }

    pub fn status_range(&self) -> String {
        self.qualified(&self.status_anchor)
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::new("TC_STATUS", "A1:A1000", "B1")
    }
}

pub trait SheetStore: Send + Sync {
    fn layout(&self) -> &SheetLayout;

    /// Rows of the range; trailing empty cells are absent, so a blank row is `[]`.
    fn read_values(
        &self,
        range: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Vec<String>>>> + Send;

    fn update_values(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> impl std::future::Future<Output = Result<WriteSummary>> + Send;
}

#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn authenticate(&self) -> Result<AccessToken>;
    async fn fetch_last_status(&self, case_id: &CaseId, token: &AccessToken)
        -> Result<NormalizedStatus>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<CaseId>>;
    async fn transform(&self, case_ids: Vec<CaseId>) -> Result<Vec<StatusRow>>;
    async fn load(&self, rows: Vec<StatusRow>) -> Result<WriteSummary>;
}
