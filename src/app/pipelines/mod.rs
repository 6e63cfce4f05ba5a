pub mod status_sync;

pub use status_sync::StatusSyncPipeline;
