//! The sort resolver.
//!
//! Sorting is stable: records that compare equal keep their load order.
//! Storage backends reproduce this by ordering on the load sequence number
//! as a final ascending key.

use std::cmp::Ordering;

use crate::{
  query::{SortBy, SortOrder},
  record::SalesRecord,
};

/// How a requested `sortOrder` is treated when sorting by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSortPolicy {
  /// Date sorts are always newest-first, whatever order was requested.
  AlwaysDescending,
  /// Date sorts follow the requested order like every other key.
  HonorRequest,
}

/// Dashboards list the newest sales first; the requested order is ignored
/// for date sorts.
pub const DATE_SORT_POLICY: DateSortPolicy = DateSortPolicy::AlwaysDescending;

/// A resolved sort: the key plus the direction that will actually be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
  pub key:       SortBy,
  pub direction: SortOrder,
}

impl SortSpec {
  /// Resolve the requested key and order under [`DATE_SORT_POLICY`].
  pub fn resolve(key: SortBy, requested: SortOrder) -> Self {
    Self::resolve_with(key, requested, DATE_SORT_POLICY)
  }

  pub fn resolve_with(key: SortBy, requested: SortOrder, policy: DateSortPolicy) -> Self {
    let direction = match (key, policy) {
      (SortBy::Date, DateSortPolicy::AlwaysDescending) => SortOrder::Desc,
      _ => requested,
    };
    Self { key, direction }
  }

  /// Compare two records under this spec.
  pub fn compare(&self, a: &SalesRecord, b: &SalesRecord) -> Ordering {
    let ascending = match self.key {
      SortBy::Date => a.date.cmp(&b.date),
      SortBy::Quantity => a.quantity.cmp(&b.quantity),
      SortBy::CustomerName => compare_names(&a.customer_name, &b.customer_name),
    };
    match self.direction {
      SortOrder::Asc => ascending,
      SortOrder::Desc => ascending.reverse(),
    }
  }

  /// Stable-sort `records` in place.
  pub fn sort(&self, records: &mut [&SalesRecord]) {
    records.sort_by(|a, b| self.compare(a, b));
  }
}

/// Case-insensitive collation with the raw name as a tie-breaker, so that
/// "alice" and "Alice" still have a defined order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}
