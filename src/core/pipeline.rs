use crate::core::parser::MessageParser;
use crate::core::splitter::split_response;
use crate::domain::model::{InsertOutcome, MessageRecord, PollReport, TransformResult};
use crate::domain::ports::{Modem, Pipeline, TransactionStore};
use crate::utils::error::Result;
use chrono::Utc;

/// 數據機 → 切分 → 解析 → 存放 的單輪處理流程
pub struct IngestPipeline<M: Modem, S: TransactionStore> {
    modem: M,
    store: S,
    parser: MessageParser,
}

impl<M: Modem, S: TransactionStore> IngestPipeline<M, S> {
    pub fn new(modem: M, store: S) -> Result<Self> {
        Ok(Self {
            modem,
            store,
            parser: MessageParser::new()?,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait::async_trait]
impl<M: Modem, S: TransactionStore> Pipeline for IngestPipeline<M, S> {
    async fn extract(&self) -> Result<Vec<MessageRecord>> {
        let raw = self.modem.list_messages().await?;
        let records = split_response(&raw);

        if records.is_empty() {
            tracing::warn!("No SMS messages found.");
        } else {
            tracing::debug!("Modem listed {} messages", records.len());
        }

        Ok(records)
    }

    async fn transform(&self, data: Vec<MessageRecord>) -> Result<TransformResult> {
        let mut result = TransformResult {
            listed: data.len(),
            ..TransformResult::default()
        };

        for record in data {
            tracing::debug!("Processing message content: {}", record.body);

            match self.parser.parse(&record.body) {
                Ok(transaction) => result.transactions.push(transaction),
                Err(failure) => {
                    tracing::warn!("Failed to parse M-Pesa message ({}): {}", failure, record.header);
                    result.rejected += 1;
                }
            }
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<PollReport> {
        let mut report = PollReport::new(Utc::now());
        report.listed = result.listed;
        report.parsed = result.transactions.len();
        report.rejected = result.rejected;

        for transaction in &result.transactions {
            let id = &transaction.transaction_id;

            // 先查一次省去多餘的寫入；真正的唯一性由資料表的主鍵保證
            match self.store.exists(id).await {
                Ok(true) => {
                    tracing::info!("Transaction {} already exists in the database. Skipping insert.", id);
                    report.record(&InsertOutcome::AlreadyExists);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Existence check for {} failed, relying on insert: {}", id, e);
                }
            }

            let outcome = self.store.insert(transaction).await;
            match &outcome {
                InsertOutcome::Inserted => {
                    tracing::info!("Saved M-Pesa transaction {}.", id);
                }
                InsertOutcome::AlreadyExists => {
                    tracing::info!("Transaction {} already exists in the database. Skipping insert.", id);
                }
                InsertOutcome::Failed(reason) => {
                    tracing::error!("Error saving M-Pesa transaction {}: {}", id, reason);
                }
            }
            report.record(&outcome);
        }

        Ok(report)
    }
}
