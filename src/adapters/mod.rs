// Adapters layer: concrete implementations of the domain ports (serial modem, SQLite store).

pub mod serial_modem;
pub mod sqlite_store;

pub use serial_modem::SerialModem;
pub use sqlite_store::SqliteTransactionStore;
