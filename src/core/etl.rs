use crate::core::{CaseId, Pipeline, SyncReport, WriteSummary};
use crate::utils::error::{Result, SyncError};

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    tab: String,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P, tab: impl Into<String>) -> Self {
        Self {
            pipeline,
            tab: tab.into(),
        }
    }

    /// Extract only; used by `--dry-run`.
    pub async fn preview(&self) -> Result<Vec<CaseId>> {
        let case_ids = self.pipeline.extract().await?;
        if case_ids.is_empty() {
            return Err(SyncError::NoCaseIdsError {
                tab: self.tab.clone(),
            });
        }
        Ok(case_ids)
    }

    pub async fn run(&self) -> Result<SyncReport> {
        tracing::info!("Starting status sync...");

        // Extract
        tracing::info!("📥 Reading case ids from column A ({})...", self.tab);
        let case_ids = self.preview().await?;
        tracing::info!("Found {} cases", case_ids.len());

        // Transform
        let rows = self.pipeline.transform(case_ids).await?;
        debug_assert!(rows.iter().enumerate().all(|(i, row)| row.position == i));

        // Load
        let mut report = SyncReport::from_rows(&rows, WriteSummary::default());
        report.write = self.pipeline.load(rows).await?;

        tracing::info!(
            "✅ Wrote {} statuses ({} errors) to {}",
            report.case_count,
            report.error_count,
            report.write.updated_range.as_deref().unwrap_or("the sheet")
        );
        for (status, count) in &report.tally {
            tracing::debug!("  {}: {}", status, count);
        }

        Ok(report)
    }
}
