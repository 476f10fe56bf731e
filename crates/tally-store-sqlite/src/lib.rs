//! SQLite backend for the Tally sales dashboard.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Filters, sorting and
//! pagination are pushed down into SQL over indexed columns.

mod encode;
mod schema;
mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
