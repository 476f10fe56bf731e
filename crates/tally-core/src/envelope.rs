//! Response shapes shared by every repository.

use serde::{Deserialize, Serialize};

use crate::{
  page::{PageRequest, total_pages},
  record::SalesRecord,
};

// ─── ResultEnvelope ──────────────────────────────────────────────────────────

/// One page of a filtered, sorted result set plus its page metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
  pub data:          Vec<SalesRecord>,
  /// Records matching the filter, before pagination.
  pub total_records: u64,
  /// `max(1, ceil(total_records / page_size))`.
  pub total_pages:   u64,
  pub current_page:  u64,
  pub page_size:     u64,
}

impl ResultEnvelope {
  /// Assemble an envelope from a page of data and the pre-pagination count.
  pub fn assemble(data: Vec<SalesRecord>, total_records: u64, page: PageRequest) -> Self {
    Self {
      data,
      total_records,
      total_pages: total_pages(total_records, page.size),
      current_page: page.page,
      page_size: page.size,
    }
  }
}

// ─── MetricsSummary ──────────────────────────────────────────────────────────

/// Totals across every record matching a filter, ignoring pagination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
  /// Sum of `quantity`.
  pub total_units_sold: u64,
  /// Sum of `final_amount`.
  pub total_amount:     f64,
  /// Sum of `total_amount - final_amount`.
  pub total_discount:   f64,
  pub total_records:    u64,
}

/// Running totals for a [`MetricsSummary`].
///
/// Amounts use Kahan-Babuska-Neumaier compensated summation, the same
/// algorithm SQLite applies in `SUM`/`TOTAL`, so both repositories report
/// identical floats when they add the same values in the same order.
#[derive(Debug, Clone, Copy, Default)]
struct MetricsAccumulator {
  units:    u64,
  amount:   CompensatedSum,
  discount: CompensatedSum,
  records:  u64,
}

impl MetricsAccumulator {
  /// Fold one record into the running totals.
  fn add(&mut self, record: &SalesRecord) {
    self.units += u64::from(record.quantity);
    self.amount.add(record.final_amount);
    self.discount.add(record.discount());
    self.records += 1;
  }

  fn finish(&self) -> MetricsSummary {
    MetricsSummary {
      total_units_sold: self.units,
      total_amount:     self.amount.total(),
      total_discount:   self.discount.total(),
      total_records:    self.records,
    }
  }
}

impl<'a> FromIterator<&'a SalesRecord> for MetricsSummary {
  fn from_iter<I: IntoIterator<Item = &'a SalesRecord>>(iter: I) -> Self {
    let mut acc = MetricsAccumulator::default();
    for record in iter {
      acc.add(record);
    }
    acc.finish()
  }
}

/// A float sum with a separate error term.
#[derive(Debug, Clone, Copy, Default)]
struct CompensatedSum {
  sum: f64,
  err: f64,
}

impl CompensatedSum {
  fn add(&mut self, value: f64) {
    let t = self.sum + value;
    if self.sum.abs() > value.abs() {
      self.err += (self.sum - t) + value;
    } else {
      self.err += (value - t) + self.sum;
    }
    self.sum = t;
  }

  fn total(&self) -> f64 {
    if self.err.is_finite() { self.sum + self.err } else { self.sum }
  }
}
