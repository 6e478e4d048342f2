#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_positive_number,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 整個服務的設定，建構時逐一傳入各元件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub modem: ModemConfig,
    pub store: StoreConfig,
    pub poll: PollConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub command_timeout_ms: u64,
    pub text_mode_command: String,
    pub list_command: String,
}

impl Default for ModemConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            read_timeout_ms: 5000,
            settle_delay_ms: 1000,
            command_timeout_ms: 15_000,
            text_mode_command: "AT+CMGF=1".to_string(),
            list_command: "AT+CMGL=\"ALL\"".to_string(),
        }
    }
}

impl ModemConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database_path: String,
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "mpesa.db".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            format: "compact".to_string(),
            file: None,
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("modem.port", &self.modem.port)?;
        validate_range("modem.baud_rate", self.modem.baud_rate, 300, 921_600)?;
        validate_positive_number("modem.read_timeout_ms", self.modem.read_timeout_ms, 1)?;
        validate_positive_number("modem.command_timeout_ms", self.modem.command_timeout_ms, 1)?;
        // 兩道指令各自等待 settle_delay，總和必須落在單次輪詢的時限內
        if self.modem.settle_delay_ms.saturating_mul(2) >= self.modem.command_timeout_ms {
            return Err(IngestError::ConfigValidationError {
                field: "modem.settle_delay_ms".to_string(),
                message: format!(
                    "two settle delays ({} ms each) must be shorter than modem.command_timeout_ms ({} ms)",
                    self.modem.settle_delay_ms, self.modem.command_timeout_ms
                ),
            });
        }
        validate_non_empty_string("modem.text_mode_command", &self.modem.text_mode_command)?;
        validate_non_empty_string("modem.list_command", &self.modem.list_command)?;

        validate_path("store.database_path", &self.store.database_path)?;
        validate_positive_number("store.timeout_ms", self.store.timeout_ms, 1)?;

        validate_positive_number("poll.interval_secs", self.poll.interval_secs, 1)?;

        validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;
        if let Some(file) = &self.logging.file {
            validate_path("logging.file", file)?;
        }

        Ok(())
    }
}
