use anyhow::Result;
use mpesa_sms_etl::config::StoreConfig;
use mpesa_sms_etl::core::{InsertOutcome, Transaction, TransactionStore};
use mpesa_sms_etl::domain::model::FailureReason;
use mpesa_sms_etl::SqliteTransactionStore;
use tempfile::TempDir;

fn transaction(id: &str) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        amount: "2500.00".to_string(),
        sender_name: "JANE DOE".to_string(),
        sender_phone: "0712345678".to_string(),
        transaction_date: "5/3/24".to_string(),
        transaction_time: "2:45 PM".to_string(),
    }
}

fn store_at(path: String) -> SqliteTransactionStore {
    SqliteTransactionStore::new(StoreConfig {
        database_path: path,
        timeout_ms: 5000,
    })
}

async fn initialized_store(temp_dir: &TempDir) -> Result<SqliteTransactionStore> {
    let path = temp_dir.path().join("ledger.db");
    let store = store_at(path.to_str().unwrap().to_string());
    store.initialize().await?;
    Ok(store)
}

#[tokio::test]
async fn test_insert_twice_keeps_one_row() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = initialized_store(&temp_dir).await?;
    let tx = transaction("QA12BC3456");

    assert!(!store.exists("QA12BC3456").await?);
    assert_eq!(store.insert(&tx).await, InsertOutcome::Inserted);
    assert!(store.exists("QA12BC3456").await?);

    // 直接再寫一次也只會被主鍵擋下
    assert_eq!(store.insert(&tx).await, InsertOutcome::AlreadyExists);

    let conn = rusqlite::Connection::open(temp_dir.path().join("ledger.db"))?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM mpesa_transactions WHERE transaction_id = ?1",
        ["QA12BC3456"],
        |row| row.get(0),
    )?;
    assert_eq!(count, 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_does_not_update_existing_row() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = initialized_store(&temp_dir).await?;

    let original = transaction("QA12BC3456");
    let mut altered = original.clone();
    altered.amount = "9999.99".to_string();

    assert_eq!(store.insert(&original).await, InsertOutcome::Inserted);
    assert_eq!(store.insert(&altered).await, InsertOutcome::AlreadyExists);
    assert_eq!(store.find("QA12BC3456").await?, Some(original));
    Ok(())
}

#[tokio::test]
async fn test_find_missing_returns_none() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = initialized_store(&temp_dir).await?;

    assert_eq!(store.find("NOPE000000").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_database_is_connection_failure() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing_dir = temp_dir.path().join("does-not-exist").join("ledger.db");
    let store = store_at(missing_dir.to_str().unwrap().to_string());

    match store.insert(&transaction("QA12BC3456")).await {
        InsertOutcome::Failed(FailureReason::Connection(_)) => {}
        other => panic!("expected connection failure, got {:?}", other),
    }
    assert!(store.exists("QA12BC3456").await.is_err());
    assert!(store.initialize().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_missing_table_is_query_failure() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = store_at(temp_dir.path().join("empty.db").to_str().unwrap().to_string());

    match store.insert(&transaction("QA12BC3456")).await {
        InsertOutcome::Failed(FailureReason::Query(_)) => {}
        other => panic!("expected query failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_inserts_keep_one_row() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let store = initialized_store(&temp_dir).await?;
    let first = store.clone();
    let second = store.clone();
    let tx = transaction("QA12BC3456");

    // 兩個連線同時寫入同一筆，由主鍵決定只有一筆成功
    let (a, b) = tokio::join!(first.insert(&tx), second.insert(&tx));
    let outcomes = [a, b];

    let inserted = outcomes.iter().filter(|o| **o == InsertOutcome::Inserted).count();
    let duplicates = outcomes
        .iter()
        .filter(|o| **o == InsertOutcome::AlreadyExists)
        .count();
    assert_eq!(inserted, 1, "outcomes: {:?}", outcomes);
    assert_eq!(duplicates, 1, "outcomes: {:?}", outcomes);

    let conn = rusqlite::Connection::open(temp_dir.path().join("ledger.db"))?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM mpesa_transactions", [], |row| row.get(0))?;
    assert_eq!(count, 1);
    Ok(())
}
