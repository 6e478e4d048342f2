use crate::config::ModemConfig;
use crate::domain::ports::Modem;
use crate::utils::error::{IngestError, Result};
use serialport::{ClearBuffer, SerialPort};
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 獨佔的數據機連線；整個程序期間只開一次，Drop 時釋放
pub struct SerialModem {
    port: Arc<Mutex<Box<dyn SerialPort>>>,
    config: ModemConfig,
}

impl SerialModem {
    pub fn open(config: ModemConfig) -> Result<Self> {
        tracing::info!(
            "Opening modem on {} at {} baud",
            config.port,
            config.baud_rate
        );

        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(config.read_timeout())
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .open()?;

        tracing::info!("Modem connected successfully.");
        Ok(Self {
            port: Arc::new(Mutex::new(port)),
            config,
        })
    }
}

impl Modem for SerialModem {
    async fn list_messages(&self) -> Result<String> {
        let port = Arc::clone(&self.port);
        let config = self.config.clone();
        let limit = self.config.command_timeout();

        let task = tokio::task::spawn_blocking(move || exchange(&port, &config));
        match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined?,
            Err(_) => Err(IngestError::TimeoutError {
                operation: "modem poll".to_string(),
                after: limit,
            }),
        }
    }
}

impl Drop for SerialModem {
    fn drop(&mut self) {
        // 逾時的輪詢仍持有連線時，要等該工作結束才真正關閉
        if holds_last_handle(&self.port) {
            tracing::info!("Modem connection closed.");
        } else {
            tracing::warn!("Modem connection released; closes once the pending poll finishes.");
        }
    }
}

fn holds_last_handle<T: ?Sized>(handle: &Arc<T>) -> bool {
    Arc::strong_count(handle) == 1
}

fn exchange(port: &Mutex<Box<dyn SerialPort>>, config: &ModemConfig) -> Result<String> {
    let mut guard = port.lock().map_err(|_| IngestError::ModemError {
        message: "serial port lock poisoned".to_string(),
    })?;
    let port: &mut dyn SerialPort = &mut **guard;

    port.clear(ClearBuffer::Input)?;
    send_command(port, &config.text_mode_command, config.settle_delay())?;
    send_command(port, &config.list_command, config.settle_delay())?;

    let raw = read_available(port)?;
    tracing::debug!("Raw response from modem: {}", raw);
    Ok(raw)
}

fn send_command(port: &mut dyn SerialPort, command: &str, settle: Duration) -> Result<()> {
    tracing::debug!("Sending modem command: {}", command);
    port.write_all(command.as_bytes())?;
    port.write_all(b"\r")?;
    port.flush()?;
    std::thread::sleep(settle);
    Ok(())
}

/// 讀出目前緩衝區內的所有位元組並以 UTF-8（lossy）解碼
fn read_available(port: &mut dyn SerialPort) -> Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let available = port.bytes_to_read()? as usize;
        if available == 0 {
            break;
        }

        let want = available.min(chunk.len());
        match port.read(&mut chunk[..want]) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::TimedOut => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorSeverity;

    #[test]
    fn test_open_missing_port_is_fatal() {
        let config = ModemConfig {
            port: "/dev/mpesa-sms-etl-missing-port".to_string(),
            ..ModemConfig::default()
        };

        let err = match SerialModem::open(config) {
            Ok(_) => panic!("opening a missing port should fail"),
            Err(e) => e,
        };
        assert!(matches!(err, IngestError::SerialError(_)));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_pending_poll_keeps_handle_alive() {
        let port = Arc::new(Mutex::new(()));
        assert!(holds_last_handle(&port));

        let pending = Arc::clone(&port);
        assert!(!holds_last_handle(&port));

        drop(pending);
        assert!(holds_last_handle(&port));
    }
}
