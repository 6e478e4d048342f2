use clap::Parser;
use mpesa_sms_etl::utils::error::ErrorSeverity;
use mpesa_sms_etl::utils::{logger, validation::Validate};
use mpesa_sms_etl::{
    AppConfig, CliConfig, IngestError, IngestPipeline, PollLoop, SerialModem,
    SqliteTransactionStore,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if cli.dry_run {
        display_config_summary(&config, &cli);
        return;
    }

    // 初始化日誌
    if let Err(e) = logger::init_logger(&config.logging) {
        eprintln!("❌ Could not open log output: {}", e);
        std::process::exit(1);
    }

    tracing::info!("🚀 Starting mpesa-sms-etl");
    tracing::debug!("Effective config: {:?}", config);

    if let Err(e) = run(config, &cli).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

/// 啟動期的錯誤會往上傳；進入迴圈後的錯誤只在迴圈內記錄
async fn run(config: AppConfig, cli: &CliConfig) -> Result<(), IngestError> {
    let store = SqliteTransactionStore::new(config.store.clone());
    store.initialize().await?;

    let modem = SerialModem::open(config.modem.clone())?;
    let pipeline = IngestPipeline::new(modem, store)?;
    let poll_loop = PollLoop::new(pipeline, config.poll.interval());

    if cli.once {
        let report = poll_loop.run_cycle().await?;
        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "✅ Cycle complete: {} listed, {} inserted, {} duplicates, {} rejected, {} failed",
                report.listed, report.inserted, report.duplicates, report.rejected, report.failed
            );
        }
        return Ok(());
    }

    poll_loop
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Program interrupted by user.");
        })
        .await;

    Ok(())
}

fn display_config_summary(config: &AppConfig, cli: &CliConfig) {
    println!("📋 Configuration Summary:");
    if let Some(path) = &cli.config {
        println!("  Config file: {}", path);
    }
    println!("  Modem: {} @ {} baud", config.modem.port, config.modem.baud_rate);
    println!(
        "  Commands: {} then {}",
        config.modem.text_mode_command, config.modem.list_command
    );
    println!(
        "  Timeouts: read {}ms, settle {}ms, command {}ms",
        config.modem.read_timeout_ms, config.modem.settle_delay_ms, config.modem.command_timeout_ms
    );
    println!("  Database: {}", config.store.database_path);
    println!("  Poll interval: {}s", config.poll.interval_secs);
    println!(
        "  Logging: {} -> {}",
        config.logging.format,
        config.logging.file.as_deref().unwrap_or("stderr")
    );
    println!("  🔍 DRY RUN MODE - modem and database were not opened");
}
