use crate::config::StoreConfig;
use crate::domain::model::{FailureReason, InsertOutcome, Transaction};
use crate::domain::ports::TransactionStore;
use crate::utils::error::{IngestError, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS mpesa_transactions (
    transaction_id TEXT PRIMARY KEY NOT NULL,
    amount TEXT NOT NULL,
    sender_name TEXT NOT NULL,
    sender_phone TEXT NOT NULL,
    transaction_date TEXT NOT NULL,
    transaction_time TEXT NOT NULL,
    recorded_at TEXT NOT NULL
)";

/// 以 SQLite 實作的交易存放區。
///
/// 每次操作各自開啟並關閉連線，不跨輪詢週期持有。
/// 重複的 `transaction_id` 由 PRIMARY KEY 擋下並回報 `AlreadyExists`。
#[derive(Debug, Clone)]
pub struct SqliteTransactionStore {
    config: StoreConfig,
}

impl SqliteTransactionStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// 建立資料表（若不存在），於啟動時呼叫一次
    pub async fn initialize(&self) -> Result<()> {
        let config = self.config.clone();
        self.run_blocking("schema setup", move || {
            let conn = connect(&config)?;
            conn.execute(CREATE_TABLE, [])?;
            tracing::info!("Database ready at {}", config.database_path);
            Ok(())
        })
        .await
    }

    async fn run_blocking<T, F>(&self, operation: &str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let limit = self.config.timeout();
        match tokio::time::timeout(limit, tokio::task::spawn_blocking(f)).await {
            Ok(joined) => joined?,
            Err(_) => Err(IngestError::TimeoutError {
                operation: operation.to_string(),
                after: limit,
            }),
        }
    }
}

fn connect(config: &StoreConfig) -> rusqlite::Result<Connection> {
    let conn = Connection::open(Path::new(&config.database_path))?;
    conn.busy_timeout(config.timeout())?;
    Ok(conn)
}

fn insert_row(conn: &Connection, tx: &Transaction) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO mpesa_transactions (
            transaction_id, amount, sender_name, sender_phone,
            transaction_date, transaction_time, recorded_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            tx.transaction_id,
            tx.amount,
            tx.sender_name,
            tx.sender_phone,
            tx.transaction_date,
            tx.transaction_time,
            Utc::now().to_rfc3339(),
        ],
    )
}

impl TransactionStore for SqliteTransactionStore {
    async fn exists(&self, transaction_id: &str) -> Result<bool> {
        let config = self.config.clone();
        let id = transaction_id.to_string();
        self.run_blocking("transaction lookup", move || {
            let conn = connect(&config)?;
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM mpesa_transactions WHERE transaction_id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn insert(&self, transaction: &Transaction) -> InsertOutcome {
        let config = self.config.clone();
        let tx = transaction.clone();

        let result = self
            .run_blocking("transaction insert", move || {
                let conn = match connect(&config) {
                    Ok(conn) => conn,
                    Err(e) => {
                        let reason = FailureReason::Connection(e.to_string());
                        return Ok(InsertOutcome::Failed(reason));
                    }
                };

                match insert_row(&conn, &tx) {
                    Ok(_) => Ok(InsertOutcome::Inserted),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                    {
                        Ok(InsertOutcome::AlreadyExists)
                    }
                    Err(e) => Ok(InsertOutcome::Failed(FailureReason::Query(e.to_string()))),
                }
            })
            .await;

        match result {
            Ok(outcome) => outcome,
            Err(IngestError::TimeoutError { after, .. }) => {
                InsertOutcome::Failed(FailureReason::Timeout(after))
            }
            Err(e) => InsertOutcome::Failed(FailureReason::Query(e.to_string())),
        }
    }

    async fn find(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let config = self.config.clone();
        let id = transaction_id.to_string();
        self.run_blocking("transaction lookup", move || {
            let conn = connect(&config)?;
            let found = conn
                .query_row(
                    "SELECT transaction_id, amount, sender_name, sender_phone,
                            transaction_date, transaction_time
                     FROM mpesa_transactions WHERE transaction_id = ?1",
                    params![id],
                    |row| {
                        Ok(Transaction {
                            transaction_id: row.get(0)?,
                            amount: row.get(1)?,
                            sender_name: row.get(2)?,
                            sender_phone: row.get(3)?,
                            transaction_date: row.get(4)?,
                            transaction_time: row.get(5)?,
                        })
                    },
                )
                .optional()?;
            Ok(found)
        })
        .await
    }
}
