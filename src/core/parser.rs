use crate::domain::model::{ParseFailure, Transaction};
use crate::utils::error::{IngestError, Result};
use regex::Regex;

/// M-Pesa 收款確認簡訊的完整樣板，整段比對、不拆成多個 regex。
///
/// `<ID> Confirmed.You have received Ksh<amount> from <name> <phone> on <date> at <time>`
const CONFIRMATION_TEMPLATE: &str = concat!(
    r"^([A-Z0-9]{10}) Confirmed\.You have received ",
    r"Ksh((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}) ",
    r"from (\S(?:.*?\S)?) (\d{10}) ",
    r"on (\d{1,2}/\d{1,2}/\d{2}) ",
    r"at (\d{1,2}:\d{2} (?:AM|PM))\b",
);

#[derive(Debug, Clone)]
pub struct MessageParser {
    template: Regex,
}

impl MessageParser {
    pub fn new() -> Result<Self> {
        let template = Regex::new(CONFIRMATION_TEMPLATE).map_err(|e| IngestError::ConfigError {
            message: format!("invalid confirmation template: {}", e),
        })?;
        Ok(Self { template })
    }

    /// 解析一則簡訊內容；任何欄位不符即整則失敗，不回傳部分結果
    pub fn parse(&self, body: &str) -> std::result::Result<Transaction, ParseFailure> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ParseFailure::EmptyBody);
        }

        let caps = self
            .template
            .captures(body)
            .ok_or(ParseFailure::TemplateMismatch)?;

        let transaction = Transaction {
            transaction_id: caps[1].to_string(),
            amount: caps[2].replace(',', ""),
            sender_name: caps[3].trim().to_string(),
            sender_phone: caps[4].to_string(),
            transaction_date: caps[5].to_string(),
            transaction_time: caps[6].to_string(),
        };

        tracing::debug!(
            "Transaction ID: {}, Amount: {}, Sender Name: {}, Sender Phone: {}, Date: {}, Time: {}",
            transaction.transaction_id,
            transaction.amount,
            transaction.sender_name,
            transaction.sender_phone,
            transaction.transaction_date,
            transaction.transaction_time
        );

        Ok(transaction)
    }
}
