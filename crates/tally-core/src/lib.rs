//! Core types and the query engine for the Tally sales dashboard.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! defines the record model, the query descriptor, the filter compiler, the
//! sort resolver, the paginator and the [`SalesRepository`] abstraction,
//! together with an in-memory implementation of it.

pub mod envelope;
pub mod filter;
pub mod memory;
pub mod page;
pub mod query;
pub mod record;
pub mod repository;
pub mod sort;

pub use envelope::{MetricsSummary, ResultEnvelope};
pub use memory::InMemoryRepository;
pub use query::{QueryDescriptor, RawSalesParams};
pub use record::SalesRecord;
pub use repository::SalesRepository;

#[cfg(test)]
mod tests;
