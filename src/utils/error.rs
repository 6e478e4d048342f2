use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Serial port error: {0}")]
    SerialError(#[from] serialport::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("Modem error: {message}")]
    ModemError { message: String },

    #[error("{operation} timed out after {after:?}")]
    TimeoutError { operation: String, after: Duration },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Modem,
    Storage,
    Configuration,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IngestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IngestError::SerialError(_)
            | IngestError::ModemError { .. }
            | IngestError::TimeoutError { .. } => ErrorCategory::Modem,
            IngestError::DatabaseError(_) => ErrorCategory::Storage,
            IngestError::ConfigError { .. }
            | IngestError::ConfigValidationError { .. }
            | IngestError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            IngestError::IoError(_)
            | IngestError::SerializationError(_)
            | IngestError::TaskError(_) => ErrorCategory::Runtime,
        }
    }

    /// 週期內的錯誤屬於 Medium（下一輪重試），啟動期的錯誤屬於 High 以上
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            IngestError::TimeoutError { .. } | IngestError::ModemError { .. } => {
                ErrorSeverity::Medium
            }
            IngestError::DatabaseError(_) | IngestError::IoError(_) => ErrorSeverity::High,
            IngestError::SerializationError(_) => ErrorSeverity::High,
            IngestError::SerialError(_) | IngestError::TaskError(_) => ErrorSeverity::Critical,
            IngestError::ConfigError { .. }
            | IngestError::ConfigValidationError { .. }
            | IngestError::InvalidConfigValueError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Modem => {
                "Check that the modem is plugged in, the port name is correct and no other program holds it"
            }
            ErrorCategory::Storage => {
                "Check that the database path is writable and the file is not locked by another process"
            }
            ErrorCategory::Configuration => {
                "Review the TOML configuration file and command line overrides"
            }
            ErrorCategory::Runtime => "Re-run with --verbose and inspect the log output",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IngestError::SerialError(e) => format!("Could not talk to the modem: {}", e),
            IngestError::ModemError { message } => format!("Modem problem: {}", message),
            IngestError::TimeoutError { operation, .. } => {
                format!("The {} did not finish in time", operation)
            }
            IngestError::DatabaseError(e) => format!("Could not use the transaction database: {}", e),
            IngestError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
