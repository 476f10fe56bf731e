//! Error types for the tally-ingest loader.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid date for transaction {transaction_id:?}: {value:?}")]
  InvalidDate { transaction_id: String, value: String },

  #[error("missing transaction id")]
  MissingTransactionId,

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
