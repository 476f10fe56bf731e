//! The `SalesRepository` trait.
//!
//! A repository owns (or fronts) a read-only set of [`SalesRecord`]s and
//! answers search/filter/sort/paginate queries over it. Implemented by
//! [`InMemoryRepository`](crate::memory::InMemoryRepository) here and by the
//! SQLite-backed store in `tally-store-sqlite`. The HTTP layer depends on
//! this abstraction, not on any concrete backend, and both implementations
//! must return identical envelopes for the same query and data.
//!
//! [`SalesRecord`]: crate::record::SalesRecord

use std::future::Future;

use crate::{
  envelope::{MetricsSummary, ResultEnvelope},
  query::QueryDescriptor,
};

/// Abstraction over a sales-record source.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SalesRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run the full search/filter/sort/paginate read for `query`.
  ///
  /// An empty result is a well-formed envelope, never an error. Only
  /// failures of the underlying storage are reported as `Err`.
  fn query<'a>(
    &'a self,
    query: &'a QueryDescriptor,
  ) -> impl Future<Output = Result<ResultEnvelope, Self::Error>> + Send + 'a;

  /// Totals over every record matching `query`'s filter, ignoring its
  /// sort and pagination.
  fn aggregate<'a>(
    &'a self,
    query: &'a QueryDescriptor,
  ) -> impl Future<Output = Result<MetricsSummary, Self::Error>> + Send + 'a;
}
