pub mod etl;

pub use crate::domain::model::{CaseId, NormalizedStatus, StatusRow, SyncReport, WriteSummary};
pub use crate::domain::ports::{Pipeline, ResultSource, SheetLayout, SheetStore};
pub use crate::utils::error::Result;
