use crate::domain::model::{InsertOutcome, MessageRecord, PollReport, Transaction, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Modem: Send + Sync {
    /// 送出「設定文字模式、列出全部簡訊」兩道指令並回傳解碼後的回應
    fn list_messages(&self) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait TransactionStore: Send + Sync {
    fn exists(
        &self,
        transaction_id: &str,
    ) -> impl std::future::Future<Output = Result<bool>> + Send;

    fn insert(
        &self,
        transaction: &Transaction,
    ) -> impl std::future::Future<Output = InsertOutcome> + Send;

    fn find(
        &self,
        transaction_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Transaction>>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MessageRecord>>;
    async fn transform(&self, data: Vec<MessageRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<PollReport>;
}
