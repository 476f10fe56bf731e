//! The filter compiler.
//!
//! [`CompiledFilter::compile`] turns a [`QueryDescriptor`] into a normalised
//! set of active constraints. The in-memory repository evaluates it directly
//! with [`CompiledFilter::matches`]; storage backends translate the same
//! structure into their native filter language, so the fail-open decisions
//! below are made exactly once.
//!
//! A record matches iff every active dimension matches. Inactive dimensions
//! (empty sets, absent or invalid ranges, blank search) never exclude
//! anything.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
  query::{IgnoredParam, QueryDescriptor},
  record::SalesRecord,
};

// ─── Constraint types ────────────────────────────────────────────────────────

/// A normalised free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
  /// Lowercased, trimmed term matched as a substring of the customer name.
  pub name_fragment:  String,
  /// Set when the term is numeric; matched as a substring of the phone
  /// number.
  pub phone_fragment: Option<String>,
}

impl SearchTerm {
  fn parse(raw: &str) -> Option<Self> {
    let term = raw.trim();
    if term.is_empty() {
      return None;
    }
    let digits = term.strip_prefix('+').unwrap_or(term);
    let phone_fragment = (!digits.is_empty()
      && digits.bytes().all(|b| b.is_ascii_digit()))
    .then(|| digits.to_owned());

    Some(Self { name_fragment: term.to_lowercase(), phone_fragment })
  }

  pub fn matches(&self, record: &SalesRecord) -> bool {
    record
      .customer_name
      .to_lowercase()
      .contains(&self.name_fragment)
      || self
        .phone_fragment
        .as_deref()
        .is_some_and(|digits| record.phone_number.contains(digits))
  }
}

/// Inclusive age interval, only ever constructed with `0 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeBounds {
  pub min: i64,
  pub max: i64,
}

/// Inclusive interval of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

// ─── CompiledFilter ──────────────────────────────────────────────────────────

/// The active constraints of one query. Multi-value sets are lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilter {
  pub search:          Option<SearchTerm>,
  pub regions:         Vec<String>,
  pub genders:         Vec<String>,
  pub categories:      Vec<String>,
  pub payment_methods: Vec<String>,
  pub tags:            Vec<String>,
  pub age:             Option<AgeBounds>,
  pub dates:           Option<DateBounds>,
  /// Range dimensions that were supplied but could not be applied.
  pub ignored:         Vec<IgnoredParam>,
}

impl CompiledFilter {
  /// Compile `query`. Never fails: a malformed dimension is recorded in
  /// [`Self::ignored`] and left unconstrained.
  pub fn compile(query: &QueryDescriptor) -> Self {
    let mut ignored = Vec::new();

    let age = query.age_range.and_then(|(min, max)| {
      if min >= 0 && min <= max {
        Some(AgeBounds { min, max })
      } else {
        ignored.push(IgnoredParam::new(
          "ageRange",
          format!("{min},{max}"),
          "requires 0 <= min <= max",
        ));
        None
      }
    });

    let dates = query.date_range.as_ref().and_then(|(start, end)| {
      match (parse_day(start), parse_day(end)) {
        (Some(start), Some(end)) => Some(DateBounds { start, end }),
        _ => {
          ignored.push(IgnoredParam::new(
            "dateRange",
            format!("{start},{end}"),
            "unparseable date",
          ));
          None
        }
      }
    });

    Self {
      search: query.search.as_deref().and_then(SearchTerm::parse),
      regions: lowercase_all(&query.regions),
      genders: lowercase_all(&query.genders),
      categories: lowercase_all(&query.categories),
      payment_methods: lowercase_all(&query.payment_methods),
      tags: lowercase_all(&query.tags),
      age,
      dates,
      ignored,
    }
  }

  /// `true` when no dimension is active.
  pub fn is_unconstrained(&self) -> bool {
    self.search.is_none()
      && self.regions.is_empty()
      && self.genders.is_empty()
      && self.categories.is_empty()
      && self.payment_methods.is_empty()
      && self.tags.is_empty()
      && self.age.is_none()
      && self.dates.is_none()
  }

  /// The in-memory predicate.
  pub fn matches(&self, record: &SalesRecord) -> bool {
    self.search.as_ref().is_none_or(|s| s.matches(record))
      && is_member(&self.regions, &record.customer_region)
      && is_member(&self.genders, &record.gender)
      && is_member(&self.categories, &record.product_category)
      && is_member(&self.payment_methods, &record.payment_method)
      && (self.tags.is_empty()
        || record
          .tags
          .iter()
          .any(|t| self.tags.contains(&t.to_lowercase())))
      && self.age.is_none_or(|a| {
        let age = i64::from(record.age);
        a.min <= age && age <= a.max
      })
      && self
        .dates
        .is_none_or(|d| d.start <= record.date && record.date <= d.end)
  }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
  values
    .iter()
    .map(|v| v.trim().to_lowercase())
    .filter(|v| !v.is_empty())
    .collect()
}

fn is_member(set: &[String], value: &str) -> bool {
  set.is_empty() || {
    let value = value.to_lowercase();
    set.iter().any(|v| *v == value)
  }
}

/// Parse a date bound at day granularity. Accepts `YYYY-MM-DD`, RFC 3339
/// timestamps and naive `YYYY-MM-DDTHH:MM:SS` timestamps; the time of day
/// is discarded.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    .or_else(|| {
      NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
    })
}
