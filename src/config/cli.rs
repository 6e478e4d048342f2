use crate::config::AppConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "mpesa-sms-etl")]
#[command(about = "Poll a GSM modem and store M-Pesa payment confirmations")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Serial port of the modem (e.g. /dev/ttyUSB0, COM10)
    #[arg(long)]
    pub port: Option<String>,

    #[arg(long)]
    pub baud_rate: Option<u32>,

    /// SQLite database file
    #[arg(long)]
    pub database: Option<String>,

    /// Seconds to wait between polls
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Show the effective configuration without opening the modem
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// 載入設定檔（若有），再套用命令列覆蓋
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = &self.port {
            config.modem.port = port.clone();
        }
        if let Some(baud_rate) = self.baud_rate {
            config.modem.baud_rate = baud_rate;
        }
        if let Some(database) = &self.database {
            config.store.database_path = database.clone();
        }
        if let Some(interval) = self.interval_secs {
            config.poll.interval_secs = interval;
        }
        if let Some(log_file) = &self.log_file {
            config.logging.file = Some(log_file.clone());
        }
        if self.json {
            config.logging.format = "json".to_string();
        }
        if self.verbose {
            config.logging.verbose = true;
        }
    }
}
