//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date parse error: {0}")]
  DateParse(String),

  #[error("store schema version {found} does not match {expected}; re-import the dataset")]
  SchemaVersion { found: i64, expected: i64 },

  #[error("duplicate transaction id: {0}")]
  DuplicateTransaction(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
