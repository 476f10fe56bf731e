//! [`InMemoryRepository`]: a [`SalesRepository`] over a resident record set.
//!
//! The record set is loaded once at startup and shared read-only; every
//! query filters, sorts and windows it from scratch.

use std::{convert::Infallible, future::Future, sync::Arc};

use tracing::debug;

use crate::{
  envelope::{MetricsSummary, ResultEnvelope},
  filter::CompiledFilter,
  page::PageRequest,
  query::{DEFAULT_PAGE_SIZE, QueryDescriptor},
  record::SalesRecord,
  repository::SalesRepository,
  sort::SortSpec,
};

/// A repository holding every record in memory.
///
/// Cloning is cheap; the record set is reference-counted and never
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
  records:           Arc<[SalesRecord]>,
  default_page_size: u64,
}

impl InMemoryRepository {
  /// Take ownership of `records`. Their order is the load order used to
  /// break sort ties.
  pub fn new(records: Vec<SalesRecord>) -> Self {
    Self { records: records.into(), default_page_size: DEFAULT_PAGE_SIZE }
  }

  /// Override the page size used when a query carries none.
  pub fn with_default_page_size(mut self, size: u64) -> Self {
    self.default_page_size = size.max(1);
    self
  }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  fn matching(&self, filter: &CompiledFilter) -> Vec<&SalesRecord> {
    self.records.iter().filter(|r| filter.matches(r)).collect()
  }

  /// Synchronous body of [`SalesRepository::query`].
  pub fn run_query(&self, query: &QueryDescriptor) -> ResultEnvelope {
    let filter = CompiledFilter::compile(query);
    let mut hits = self.matching(&filter);
    SortSpec::resolve(query.sort_by, query.sort_order).sort(&mut hits);

    let page = PageRequest::normalize(query.page, query.page_size, self.default_page_size);
    let data: Vec<SalesRecord> =
      page.window(&hits).iter().map(|r| (*r).clone()).collect();

    debug!(
      matched = hits.len(),
      returned = data.len(),
      page = page.page,
      "in-memory query"
    );
    ResultEnvelope::assemble(data, hits.len() as u64, page)
  }

  /// Synchronous body of [`SalesRepository::aggregate`]. A separate full
  /// pass over the records, independent of any page.
  pub fn run_aggregate(&self, query: &QueryDescriptor) -> MetricsSummary {
    let filter = CompiledFilter::compile(query);
    self.records.iter().filter(|r| filter.matches(r)).collect()
  }
}

impl SalesRepository for InMemoryRepository {
  type Error = Infallible;

  fn query<'a>(
    &'a self,
    query: &'a QueryDescriptor,
  ) -> impl Future<Output = Result<ResultEnvelope, Infallible>> + Send + 'a {
    std::future::ready(Ok(self.run_query(query)))
  }

  fn aggregate<'a>(
    &'a self,
    query: &'a QueryDescriptor,
  ) -> impl Future<Output = Result<MetricsSummary, Infallible>> + Send + 'a {
    std::future::ready(Ok(self.run_aggregate(query)))
  }
}
