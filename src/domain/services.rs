use crate::domain::model::{CaseId, NormalizedStatus, WriteSummary};
use crate::domain::ports::SheetStore;
use crate::utils::error::Result;

/// Maps a raw TestOps status onto the dashboard vocabulary.
///
/// `UNKNOWN` (or an empty string) becomes `SKIPPED`, `BROKEN` becomes `FAILED`,
/// everything else is kept uppercased.
pub fn normalize(raw: &str) -> NormalizedStatus {
    let upper = raw.to_uppercase();
    match upper.as_str() {
        "" | "UNKNOWN" | "SKIPPED" => NormalizedStatus::Skipped,
        "BROKEN" | "FAILED" => NormalizedStatus::Failed,
        "PASSED" => NormalizedStatus::Passed,
        "NO_RESULT" => NormalizedStatus::NoResult,
        _ => NormalizedStatus::Other(upper),
    }
}

/// 過濾欄位內容，保留原本的列順序
pub fn parse_case_ids(rows: &[Vec<String>]) -> Vec<CaseId> {
    rows.iter()
        .filter_map(|row| row.first())
        .filter_map(|cell| CaseId::from_cell(cell))
        .collect()
}

/// Reads the id column of the status tab. An empty result is returned as-is;
/// the caller decides whether that is fatal.
pub async fn read_case_ids<S: SheetStore>(sheet: &S) -> Result<Vec<CaseId>> {
    let range = sheet.layout().id_range();
    tracing::debug!("Reading case ids from {}", range);

    let rows = sheet.read_values(&range).await?;
    let ids = parse_case_ids(&rows);

    tracing::debug!("{} of {} rows hold a case id", ids.len(), rows.len());
    Ok(ids)
}

/// Overwrites the status column starting at the anchor cell, one value per row.
pub async fn write_statuses<S: SheetStore>(sheet: &S, statuses: &[String]) -> Result<WriteSummary> {
    if statuses.is_empty() {
        tracing::debug!("No statuses to write, skipping sheet update");
        return Ok(WriteSummary::default());
    }

    let range = sheet.layout().status_range();
    let values = statuses.iter().map(|s| vec![s.clone()]).collect();

    tracing::debug!("Writing {} statuses to {}", statuses.len(), range);
    sheet.update_values(&range, values).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SheetLayout;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockSheet {
        column: Vec<Vec<String>>,
        writes: Arc<Mutex<Vec<(String, Vec<Vec<String>>)>>>,
        layout: SheetLayout,
    }

    impl SheetStore for MockSheet {
        fn layout(&self) -> &SheetLayout {
            &self.layout
        }

        async fn read_values(&self, _range: &str) -> Result<Vec<Vec<String>>> {
            Ok(self.column.clone())
        }

        async fn update_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<WriteSummary> {
            let rows = values.len() as u32;
            self.writes.lock().await.push((range.to_string(), values));
            Ok(WriteSummary {
                updated_range: Some(range.to_string()),
                updated_rows: rows,
                updated_columns: 1,
                updated_cells: rows,
            })
        }
    }

    fn column(cells: &[&str]) -> Vec<Vec<String>> {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    vec![]
                } else {
                    vec![c.to_string()]
                }
            })
            .collect()
    }

    #[test]
    fn test_normalize_mapping() {
        assert_eq!(normalize("UNKNOWN"), NormalizedStatus::Skipped);
        assert_eq!(normalize("unknown"), NormalizedStatus::Skipped);
        assert_eq!(normalize(""), NormalizedStatus::Skipped);
        assert_eq!(normalize("BROKEN"), NormalizedStatus::Failed);
        assert_eq!(normalize("broken"), NormalizedStatus::Failed);
        assert_eq!(normalize("passed"), NormalizedStatus::Passed);
        assert_eq!(normalize("Failed"), NormalizedStatus::Failed);
        assert_eq!(
            normalize("in_progress"),
            NormalizedStatus::Other("IN_PROGRESS".to_string())
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "passed", "FAILED", "broken", "unknown", "", "skipped", "NO_RESULT", "blocked",
        ] {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "raw status {:?}", raw);
        }
    }

    #[test]
    fn test_parse_case_ids_filters_and_keeps_order() {
        let rows = column(&["101", "# comment", "102:expected-fail", ""]);
        let ids: Vec<String> = parse_case_ids(&rows)
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["101", "102"]);

        let rows = column(&["300", "title", "200", "  ", "100:x"]);
        let ids: Vec<String> = parse_case_ids(&rows)
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(ids, vec!["300", "200", "100"]);
    }

    #[test]
    fn test_read_case_ids_from_sheet() {
        let sheet = MockSheet {
            column: column(&["Case", "11", "#12", "13:flaky"]),
            ..Default::default()
        };

        let ids = tokio_test::block_on(read_case_ids(&sheet)).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "11");
        assert_eq!(ids[1].as_str(), "13");
    }

    #[tokio::test]
    async fn test_write_statuses_empty_is_noop() {
        let sheet = MockSheet::default();

        let summary = write_statuses(&sheet, &[]).await.unwrap();

        assert_eq!(summary, WriteSummary::default());
        assert!(sheet.writes.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_statuses_single_column_in_order() {
        let sheet = MockSheet::default();
        let statuses = vec!["PASSED".to_string(), "NO_RESULT".to_string()];

        let summary = write_statuses(&sheet, &statuses).await.unwrap();

        assert_eq!(summary.updated_rows, 2);
        let writes = sheet.writes.lock().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "'TC_STATUS'!B1");
        assert_eq!(
            writes[0].1,
            vec![vec!["PASSED".to_string()], vec!["NO_RESULT".to_string()]]
        );
    }
}
