pub mod parser;
pub mod pipeline;
pub mod poll_loop;
pub mod splitter;

pub use crate::domain::model::{
    InsertOutcome, MessageRecord, ParseFailure, PollReport, Transaction, TransformResult,
};
pub use crate::domain::ports::{Modem, Pipeline, TransactionStore};
pub use crate::utils::error::Result;
