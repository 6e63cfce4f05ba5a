use crate::config::RunSettings;
use crate::domain::model::{CaseId, StatusRow, WriteSummary};
use crate::domain::ports::{Pipeline, ResultSource, SheetStore};
use crate::domain::services::{read_case_ids, write_statuses};
use crate::utils::error::Result;

/// Reads case ids from the sheet, asks TestOps for each last run and writes
/// the statuses back next to the ids.
pub struct StatusSyncPipeline<S: SheetStore, R: ResultSource> {
    pub(crate) sheet: S,
    pub(crate) source: R,
    pub(crate) run: RunSettings,
}

impl<S: SheetStore, R: ResultSource> StatusSyncPipeline<S, R> {
    pub fn new(sheet: S, source: R, run: RunSettings) -> Self {
        Self { sheet, source, run }
    }
}

#[async_trait::async_trait]
impl<S: SheetStore, R: ResultSource> Pipeline for StatusSyncPipeline<S, R> {
    async fn extract(&self) -> Result<Vec<CaseId>> {
        read_case_ids(&self.sheet).await
    }

    async fn transform(&self, case_ids: Vec<CaseId>) -> Result<Vec<StatusRow>> {
        // 取不到 token 就整批中止
        tracing::info!("🔐 Authenticating to TestOps...");
        let token = self.source.authenticate().await?;

        tracing::info!("📡 Fetching last run status for {} cases...", case_ids.len());
        let total = case_ids.len();
        let mut rows = Vec::with_capacity(total);

        for (position, case_id) in case_ids.into_iter().enumerate() {
            if position > 0 && !self.run.request_delay().is_zero() {
                tokio::time::sleep(self.run.request_delay()).await;
            }

            let outcome = match self.source.fetch_last_status(&case_id, &token).await {
                Ok(status) => {
                    tracing::info!("  [{}/{}] #{} -> {}", position + 1, total, case_id, status);
                    Ok(status)
                }
                Err(e) => {
                    tracing::warn!("  [{}/{}] #{} -> ERROR: {}", position + 1, total, case_id, e);
                    Err(e.to_string())
                }
            };

            rows.push(StatusRow {
                position,
                case_id,
                outcome,
            });
        }

        Ok(rows)
    }

    async fn load(&self, rows: Vec<StatusRow>) -> Result<WriteSummary> {
        let statuses: Vec<String> = rows
            .iter()
            .map(|row| row.cell_value(self.run.error_marker_len))
            .collect();

        tracing::info!("📝 Writing {} statuses to the sheet...", statuses.len());
        write_statuses(&self.sheet, &statuses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AccessToken, NormalizedStatus};
    use crate::domain::ports::SheetLayout;
    use crate::utils::error::SyncError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockSheet {
        column: Vec<Vec<String>>,
        written: Arc<Mutex<Option<Vec<Vec<String>>>>>,
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
            *self.written.lock().await = Some(values);
            Ok(WriteSummary {
                updated_range: Some(range.to_string()),
                updated_rows: rows,
                updated_columns: 1,
                updated_cells: rows,
            })
        }
    }

    /// 以 id 決定結果；"500" 模擬網路錯誤
    #[derive(Default)]
    struct ScriptedSource {
        fetches: AtomicUsize,
        reject_login: bool,
    }

    #[async_trait::async_trait]
    impl ResultSource for ScriptedSource {
        async fn authenticate(&self) -> Result<AccessToken> {
            if self.reject_login {
                return Err(SyncError::AuthError {
                    message: "no access_token in response".to_string(),
                });
            }
            Ok(AccessToken::new("tok"))
        }

        async fn fetch_last_status(
            &self,
            case_id: &CaseId,
            _token: &AccessToken,
        ) -> Result<NormalizedStatus> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            match case_id.as_str() {
                "500" => Err(SyncError::CaseFetchError {
                    case_id: case_id.to_string(),
                    message: "connection reset by peer while reading the response body".to_string(),
                }),
                "101" => Ok(NormalizedStatus::NoResult),
                _ => Ok(NormalizedStatus::Passed),
            }
        }
    }

    fn ids(raw: &[&str]) -> Vec<CaseId> {
        raw.iter().filter_map(|r| CaseId::from_cell(r)).collect()
    }

    fn run_settings() -> RunSettings {
        RunSettings {
            request_delay_ms: 0,
            error_marker_len: 50,
        }
    }

    #[tokio::test]
    async fn test_transform_isolates_item_errors() {
        let pipeline =
            StatusSyncPipeline::new(MockSheet::default(), ScriptedSource::default(), run_settings());

        let rows = pipeline
            .transform(ids(&["101", "500", "7"]))
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].outcome, Ok(NormalizedStatus::NoResult));
        assert!(rows[1].is_error());
        assert_eq!(rows[2].outcome, Ok(NormalizedStatus::Passed));
        assert_eq!(pipeline.source.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transform_stops_on_auth_failure() {
        let source = ScriptedSource {
            reject_login: true,
            ..Default::default()
        };
        let pipeline = StatusSyncPipeline::new(MockSheet::default(), source, run_settings());

        let result = pipeline.transform(ids(&["1", "2"])).await;

        assert!(matches!(result, Err(SyncError::AuthError { .. })));
        assert_eq!(pipeline.source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_load_writes_truncated_markers() {
        let sheet = MockSheet::default();
        let pipeline = StatusSyncPipeline::new(sheet.clone(), ScriptedSource::default(), run_settings());

        let rows = pipeline.transform(ids(&["500", "9"])).await.unwrap();
        pipeline.load(rows).await.unwrap();

        let written = sheet.written.lock().await.clone().unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0][0].starts_with("ERROR: Case #500"));
        assert_eq!(written[0][0].chars().count(), 50);
        assert_eq!(written[1][0], "PASSED");
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_requests() {
        let pipeline = StatusSyncPipeline::new(
            MockSheet::default(),
            ScriptedSource::default(),
            RunSettings {
                request_delay_ms: 100,
                error_marker_len: 50,
            },
        );

        let started = tokio::time::Instant::now();
        pipeline.transform(ids(&["1", "2", "3"])).await.unwrap();

        // 三筆之間只有兩次等待
        let elapsed = started.elapsed();
        assert!(elapsed >= std::time::Duration::from_millis(200));
        assert!(elapsed < std::time::Duration::from_millis(300));
    }
}
