// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod google_auth;
pub mod sheets;
pub mod testops;

pub use sheets::SheetsClient;
pub use testops::TestOpsClient;
