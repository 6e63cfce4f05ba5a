pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::{SheetsClient, TestOpsClient};
pub use app::pipelines::StatusSyncPipeline;
pub use config::SyncConfig;
pub use core::etl::EtlEngine;
pub use domain::services::normalize;
pub use utils::error::{Result, SyncError};
