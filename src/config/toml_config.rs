use crate::config::AppConfig;
use crate::utils::error::{IngestError, Result};
use regex::Regex;
use std::path::Path;

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IngestError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未列出的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IngestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}

/// 替換環境變數 (例如 ${DB_PATH})，未設定的變數保留原文
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IngestError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[modem]
port = "COM10"
baud_rate = 115200
settle_delay_ms = 500
list_command = 'AT+CMGL="REC UNREAD"'

[store]
database_path = "/var/lib/mpesa/transactions.db"
timeout_ms = 2000

[poll]
interval_secs = 30

[logging]
verbose = true
format = "json"
file = "sms_processing.log"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.modem.port, "COM10");
        assert_eq!(config.modem.baud_rate, 115200);
        assert_eq!(config.modem.settle_delay_ms, 500);
        assert_eq!(config.modem.list_command, "AT+CMGL=\"REC UNREAD\"");
        assert_eq!(config.modem.text_mode_command, "AT+CMGF=1");
        assert_eq!(config.store.database_path, "/var/lib/mpesa/transactions.db");
        assert_eq!(config.poll.interval_secs, 30);
        assert_eq!(config.logging.file.as_deref(), Some("sms_processing.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.modem.baud_rate, 9600);
        assert_eq!(config.store.database_path, "mpesa.db");
        assert_eq!(config.poll.interval_secs, 10);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MPESA_TEST_DB_PATH", "/tmp/from-env.db");

        let toml_content = r#"
[store]
database_path = "${MPESA_TEST_DB_PATH}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.store.database_path, "/tmp/from-env.db");

        std::env::remove_var("MPESA_TEST_DB_PATH");
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[poll]\ninterval_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, IngestError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[modem]\nport = \"/dev/ttyACM0\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.modem.port, "/dev/ttyACM0");
    }
}
