use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 一則列出的簡訊：`+CMGL` 標頭行與其下一行內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub header: String,
    pub body: String,
}

/// 從確認簡訊解析出的交易，`transaction_id` 為唯一鍵
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub amount: String,
    pub sender_name: String,
    pub sender_phone: String,
    pub transaction_date: String,
    pub transaction_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("message body is empty")]
    EmptyBody,

    #[error("message does not match the confirmation template")]
    TemplateMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Connection(String),
    Timeout(Duration),
    Query(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Connection(msg) => write!(f, "connection error: {}", msg),
            FailureReason::Timeout(after) => write!(f, "timed out after {:?}", after),
            FailureReason::Query(msg) => write!(f, "query error: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
    Failed(FailureReason),
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub transactions: Vec<Transaction>,
    pub listed: usize,
    pub rejected: usize,
}

/// 單一輪詢週期的統計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollReport {
    pub started_at: DateTime<Utc>,
    pub listed: usize,
    pub parsed: usize,
    pub rejected: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl PollReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            listed: 0,
            parsed: 0,
            rejected: 0,
            inserted: 0,
            duplicates: 0,
            failed: 0,
        }
    }

    pub fn record(&mut self, outcome: &InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::AlreadyExists => self.duplicates += 1,
            InsertOutcome::Failed(_) => self.failed += 1,
        }
    }
}
