pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{SerialModem, SqliteTransactionStore};
pub use config::AppConfig;
pub use core::{parser::MessageParser, pipeline::IngestPipeline, poll_loop::PollLoop};
pub use utils::error::{IngestError, Result};
