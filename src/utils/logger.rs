use crate::config::LoggingConfig;
use crate::utils::error::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mpesa_sms_etl=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mpesa_sms_etl=info"))
    }
}

/// 依設定建立日誌輸出：stderr 或附加寫入檔案，compact 或 json 格式
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let filter = default_filter(config.verbose);
    let json = config.format == "json";

    let layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let base = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false);
            if json {
                base.json().boxed()
            } else {
                base.compact().boxed()
            }
        }
        None => {
            let base = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);
            if json {
                base.json().boxed()
            } else {
                base.compact().boxed()
            }
        }
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
    Ok(())
}
