use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use testops_sheet_sync::domain::ports::SheetStore;
use testops_sheet_sync::config::load_dotenv;
use testops_sheet_sync::utils::logger;
use testops_sheet_sync::{SheetsClient, SyncConfig};

/// 與同步工具讀取的 A1:A1000 範圍一致
const MAX_ROWS: usize = 1000;

/// 連線測試：把目前時間寫進指定範圍，確認服務帳戶有編輯權限
#[derive(Parser)]
#[command(name = "sheet-probe")]
#[command(about = "Check Google Sheets access by overwriting a range with the current time")]
struct Args {
    /// Optional TOML config file (only the [sheet] section is used)
    #[arg(short, long)]
    config: Option<String>,

    /// Cells to overwrite on the status tab
    #[arg(long, default_value = "A1:A10")]
    range: String,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    load_dotenv(None);
    let config = match &args.config {
        Some(path) => SyncConfig::from_file(path)?,
        None => SyncConfig::from_env(),
    };
    if let Err(e) = config.validate_sheet() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Example: export GOOGLE_SHEET_ID=1abc...xyz (the id from the sheet URL)");
        eprintln!("   or put GOOGLE_SHEET_ID=1abc...xyz into a .env file");
        std::process::exit(1);
    }

    let rows = range_height(&args.range)?;

    println!("🔌 Connecting to Google Sheets API...");
    let sheets = SheetsClient::connect(&config.sheet, Duration::from_secs(30))
        .await
        .context("connecting to Google Sheets")?;

    let range = sheets.layout().qualified(&args.range);
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    println!("📝 Writing current time to {}...", range);
    let summary = sheets
        .update_values(&range, vec![vec![now.clone()]; rows])
        .await
        .with_context(|| format!("writing {}", range))?;

    println!(
        "✅ Done. Updated cells: {}, rows: {}.",
        summary.updated_cells, summary.updated_rows
    );
    println!("🕒 Time written: {}", now);
    Ok(())
}

/// Number of rows covered by a single-column A1 range such as `A1:A10`.
fn range_height(a1: &str) -> anyhow::Result<usize> {
    let row_of = |cell: &str| -> anyhow::Result<usize> {
        let digits: String = cell
            .trim()
            .chars()
            .skip_while(|c| c.is_ascii_alphabetic())
            .collect();
        digits
            .parse()
            .ok()
            .filter(|row| *row > 0)
            .with_context(|| format!("'{}' is not a cell reference", cell))
    };

    let height = match a1.split_once(':') {
        Some((start, end)) => {
            let (start, end) = (row_of(start)?, row_of(end)?);
            anyhow::ensure!(end >= start, "range {} ends above its start", a1);
            end - start + 1
        }
        None => {
            row_of(a1)?;
            1
        }
    };

    anyhow::ensure!(
        height <= MAX_ROWS,
        "range {} spans {} rows, at most {} are allowed",
        a1,
        height,
        MAX_ROWS
    );
    Ok(height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_height() {
        assert_eq!(range_height("A1:A10").unwrap(), 10);
        assert_eq!(range_height("B3").unwrap(), 1);
        assert_eq!(range_height("A1:A1000").unwrap(), 1000);
    }

    #[test]
    fn test_range_height_rejects_bad_ranges() {
        assert!(range_height("A5:A1").is_err());
        assert!(range_height("A1:A999999999").is_err());
        assert!(range_height("A1:A1001").is_err());
        assert!(range_height("A0").is_err());
        assert!(range_height("status").is_err());
    }
}
