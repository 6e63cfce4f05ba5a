use clap::Parser;
use testops_sheet_sync::config::{cli::LogFormat, load_dotenv};
use testops_sheet_sync::utils::{logger, validation::Validate};
use testops_sheet_sync::{
    CliArgs, EtlEngine, SheetsClient, StatusSyncPipeline, SyncConfig, SyncError, TestOpsClient,
};

fn exit_with(e: &SyncError) -> ! {
    tracing::error!(
        "❌ Status sync failed: {} (Category: {:?})",
        e,
        e.category()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

async fn build_engine(
    config: &SyncConfig,
) -> testops_sheet_sync::Result<EtlEngine<StatusSyncPipeline<SheetsClient, TestOpsClient>>> {
    tracing::info!("🔌 Connecting to Google Sheets...");
    let sheet = SheetsClient::connect(&config.sheet, config.testops.timeout()).await?;
    let testops = TestOpsClient::new(config.testops.clone())?;

    let pipeline = StatusSyncPipeline::new(sheet, testops, config.run.clone());
    Ok(EtlEngine::new(pipeline, config.sheet.tab.clone()))
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("Starting testops-sheet-sync");

    // .env 不覆蓋已設定的環境變數
    load_dotenv(None);
    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if args.verbose {
        tracing::debug!("Config: {:?}", config);
    }

    // 驗證配置：在任何網路請求之前
    let validated = if args.dry_run {
        config.validate_sheet()
    } else {
        config.validate()
    };
    if let Err(e) = validated {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let engine = match build_engine(&config).await {
        Ok(engine) => engine,
        Err(e) => exit_with(&e),
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - TestOps is not called and the sheet is not written");
        match engine.preview().await {
            Ok(case_ids) => {
                println!("Found {} cases in {}:", case_ids.len(), config.sheet.tab);
                for case_id in case_ids {
                    println!("  #{}", case_id);
                }
            }
            Err(e) => exit_with(&e),
        }
        return;
    }

    match engine.run().await {
        Ok(report) => {
            println!(
                "✅ Done. {} statuses written to {}, column {} ({} errors).",
                report.case_count, config.sheet.tab, config.sheet.status_anchor, report.error_count
            );
            for (status, count) in &report.tally {
                println!("  {:<10} {}", status, count);
            }
        }
        Err(e) => exit_with(&e),
    }
}
