//! Offset/limit windowing and page metadata.

use crate::query::DEFAULT_PAGE_SIZE;

/// A normalised page request: `page >= 1`, `size >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u64,
  pub size: u64,
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, size: DEFAULT_PAGE_SIZE } }
}

impl PageRequest {
  /// Missing or non-positive `page` becomes 1; missing or non-positive
  /// `size` becomes `default_size` (itself clamped to at least 1).
  pub fn normalize(page: Option<i64>, size: Option<i64>, default_size: u64) -> Self {
    let page = page.filter(|p| *p > 0).map_or(1, |p| p as u64);
    let size = size
      .filter(|s| *s > 0)
      .map_or(default_size.max(1), |s| s as u64);
    Self { page, size }
  }

  /// Zero-based index of the first element on this page.
  pub fn offset(&self) -> u64 { self.page.saturating_sub(1).saturating_mul(self.size) }

  /// The slice of `items` that falls on this page; empty when the offset
  /// lies past the end.
  pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
    let len = items.len();
    let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(len);
    let end = start
      .saturating_add(usize::try_from(self.size).unwrap_or(usize::MAX))
      .min(len);
    &items[start..end]
  }
}

/// `ceil(total_records / page_size)`, never less than 1.
pub fn total_pages(total_records: u64, page_size: u64) -> u64 {
  total_records.div_ceil(page_size.max(1)).max(1)
}
