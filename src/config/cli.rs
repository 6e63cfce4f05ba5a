use crate::config::SyncConfig;
use crate::utils::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "testops-sheet-sync")]
#[command(about = "Sync last TestOps run status of each test case into a Google Sheet")]
pub struct CliArgs {
    /// Optional TOML config file; environment variables still take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Read and list the case ids without calling TestOps or writing the sheet
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl CliArgs {
    pub fn load_config(&self) -> Result<SyncConfig> {
        match &self.config {
            Some(path) => SyncConfig::from_file(path),
            None => Ok(SyncConfig::from_env()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_valid() {
        let args = CliArgs::try_parse_from(["testops-sheet-sync"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.verbose);
        assert!(!args.dry_run);
        assert_eq!(args.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::try_parse_from([
            "testops-sheet-sync",
            "--config",
            "sync.toml",
            "-v",
            "--dry-run",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("sync.toml")));
        assert!(args.verbose);
        assert!(args.dry_run);
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
