//! The query descriptor and the flat parameter contract it is parsed from.
//!
//! Parsing is fail-open: a malformed parameter is dropped (the dimension it
//! would have constrained stays unconstrained) and reported as an
//! [`IgnoredParam`] instead of failing the request.

use serde::{Deserialize, Serialize};

/// Page size used when a request does not carry a usable `pageSize`.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

// ─── Sort parameters ─────────────────────────────────────────────────────────

/// The field a result set is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
  #[default]
  Date,
  Quantity,
  CustomerName,
}

impl SortBy {
  /// Parse the wire name; unknown names yield `None`.
  pub fn from_param(s: &str) -> Option<Self> {
    match s.trim() {
      "date" => Some(Self::Date),
      "quantity" => Some(Self::Quantity),
      "customerName" => Some(Self::CustomerName),
      _ => None,
    }
  }
}

/// Requested direction. Not always honoured; see
/// [`DATE_SORT_POLICY`](crate::sort::DATE_SORT_POLICY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  pub fn from_param(s: &str) -> Option<Self> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("asc") {
      Some(Self::Asc)
    } else if s.eq_ignore_ascii_case("desc") {
      Some(Self::Desc)
    } else {
      None
    }
  }
}

// ─── QueryDescriptor ─────────────────────────────────────────────────────────

/// All search/filter/sort/paginate parameters of one request.
///
/// Empty vectors and `None` ranges mean "no restriction on this dimension".
/// Validation of ranges and normalisation of paging happen later, in
/// [`CompiledFilter::compile`](crate::filter::CompiledFilter::compile) and
/// [`PageRequest::normalize`](crate::page::PageRequest::normalize).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDescriptor {
  /// Free text matched against customer name (and phone when numeric).
  pub search:          Option<String>,
  pub page:            Option<i64>,
  pub page_size:       Option<i64>,
  pub sort_by:         SortBy,
  pub sort_order:      SortOrder,
  pub regions:         Vec<String>,
  pub genders:         Vec<String>,
  pub categories:      Vec<String>,
  pub tags:            Vec<String>,
  pub payment_methods: Vec<String>,
  /// Closed interval `[min, max]`; ignored unless `0 <= min <= max`.
  pub age_range:       Option<(i64, i64)>,
  /// Closed interval of calendar dates, unparsed.
  pub date_range:      Option<(String, String)>,
}

// ─── Diagnostics ─────────────────────────────────────────────────────────────

/// A request parameter that was dropped instead of constraining the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IgnoredParam {
  /// Wire name of the parameter, e.g. `"ageRange"`.
  pub param:  &'static str,
  /// The raw value as received.
  pub value:  String,
  pub reason: &'static str,
}

impl IgnoredParam {
  pub fn new(param: &'static str, value: impl Into<String>, reason: &'static str) -> Self {
    Self { param, value: value.into(), reason }
  }
}

impl std::fmt::Display for IgnoredParam {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}={:?} ({})", self.param, self.value, self.reason)
  }
}

// ─── Raw parameters ──────────────────────────────────────────────────────────

/// The flat query-string contract, every field an optional string.
///
/// Multi-value fields are comma-separated; `ageRange` is `min,max` and
/// `dateRange` is `start,end`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSalesParams {
  pub search:          Option<String>,
  pub page:            Option<String>,
  pub page_size:       Option<String>,
  pub sort_by:         Option<String>,
  pub sort_order:      Option<String>,
  pub regions:         Option<String>,
  pub genders:         Option<String>,
  pub categories:      Option<String>,
  pub tags:            Option<String>,
  pub payment_methods: Option<String>,
  pub age_range:       Option<String>,
  pub date_range:      Option<String>,
}

impl RawSalesParams {
  /// Convert into a [`QueryDescriptor`]. Never fails; anything that cannot
  /// be interpreted is left unset and reported in the returned list.
  pub fn into_descriptor(self) -> (QueryDescriptor, Vec<IgnoredParam>) {
    let mut ignored = Vec::new();

    let page = self
      .page
      .and_then(|raw| parse_int("page", raw, &mut ignored));
    let page_size = self
      .page_size
      .and_then(|raw| parse_int("pageSize", raw, &mut ignored));

    let sort_by = match self.sort_by {
      Some(raw) => SortBy::from_param(&raw).unwrap_or_else(|| {
        ignored.push(IgnoredParam::new("sortBy", raw, "unknown sort key"));
        SortBy::default()
      }),
      None => SortBy::default(),
    };
    let sort_order = match self.sort_order {
      Some(raw) => SortOrder::from_param(&raw).unwrap_or_else(|| {
        ignored.push(IgnoredParam::new("sortOrder", raw, "unknown sort order"));
        SortOrder::default()
      }),
      None => SortOrder::default(),
    };

    let age_range = self.age_range.and_then(|raw| match split_pair(&raw) {
      Some((min, max)) => match (min.parse::<i64>(), max.parse::<i64>()) {
        (Ok(min), Ok(max)) => Some((min, max)),
        _ => {
          ignored.push(IgnoredParam::new("ageRange", raw, "bounds are not integers"));
          None
        }
      },
      None => {
        ignored.push(IgnoredParam::new("ageRange", raw, "expected min,max"));
        None
      }
    });

    let date_range = self.date_range.and_then(|raw| match split_pair(&raw) {
      Some((start, end)) => Some((start.to_owned(), end.to_owned())),
      None => {
        ignored.push(IgnoredParam::new("dateRange", raw, "expected start,end"));
        None
      }
    });

    let descriptor = QueryDescriptor {
      search: self.search,
      page,
      page_size,
      sort_by,
      sort_order,
      regions: split_list(self.regions),
      genders: split_list(self.genders),
      categories: split_list(self.categories),
      tags: split_list(self.tags),
      payment_methods: split_list(self.payment_methods),
      age_range,
      date_range,
    };

    (descriptor, ignored)
  }
}

fn parse_int(
  param: &'static str,
  raw: String,
  ignored: &mut Vec<IgnoredParam>,
) -> Option<i64> {
  match raw.trim().parse() {
    Ok(n) => Some(n),
    Err(_) => {
      ignored.push(IgnoredParam::new(param, raw, "not an integer"));
      None
    }
  }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn split_list(raw: Option<String>) -> Vec<String> {
  raw
    .map(|s| {
      s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
    })
    .unwrap_or_default()
}

/// Split `a,b` into two trimmed, non-empty halves.
fn split_pair(raw: &str) -> Option<(&str, &str)> {
  let (a, b) = raw.split_once(',')?;
  let (a, b) = (a.trim(), b.trim());
  if a.is_empty() || b.is_empty() || b.contains(',') {
    return None;
  }
  Some((a, b))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw() -> RawSalesParams { RawSalesParams::default() }

  #[test]
  fn empty_params_yield_defaults() {
    let (q, ignored) = raw().into_descriptor();
    assert_eq!(q, QueryDescriptor::default());
    assert_eq!(q.sort_by, SortBy::Date);
    assert_eq!(q.sort_order, SortOrder::Desc);
    assert!(ignored.is_empty());
  }

  #[test]
  fn multi_value_params_are_split_and_trimmed() {
    let (q, _) = RawSalesParams {
      regions: Some(" North , South,,".into()),
      tags: Some("Organic".into()),
      ..raw()
    }
    .into_descriptor();
    assert_eq!(q.regions, ["North", "South"]);
    assert_eq!(q.tags, ["Organic"]);
  }

  #[test]
  fn blank_multi_value_param_means_no_restriction() {
    let (q, _) = RawSalesParams { genders: Some("".into()), ..raw() }.into_descriptor();
    assert!(q.genders.is_empty());
  }

  #[test]
  fn sort_params_parse_and_unknown_values_fall_back() {
    let (q, ignored) = RawSalesParams {
      sort_by: Some("customerName".into()),
      sort_order: Some("ASC".into()),
      ..raw()
    }
    .into_descriptor();
    assert_eq!(q.sort_by, SortBy::CustomerName);
    assert_eq!(q.sort_order, SortOrder::Asc);
    assert!(ignored.is_empty());

    let (q, ignored) = RawSalesParams {
      sort_by: Some("price".into()),
      sort_order: Some("sideways".into()),
      ..raw()
    }
    .into_descriptor();
    assert_eq!(q.sort_by, SortBy::Date);
    assert_eq!(q.sort_order, SortOrder::Desc);
    assert_eq!(ignored.len(), 2);
  }

  #[test]
  fn malformed_numbers_are_ignored_not_rejected() {
    let (q, ignored) = RawSalesParams {
      page: Some("two".into()),
      page_size: Some("25".into()),
      age_range: Some("20,abc".into()),
      ..raw()
    }
    .into_descriptor();
    assert_eq!(q.page, None);
    assert_eq!(q.page_size, Some(25));
    assert_eq!(q.age_range, None);
    let names: Vec<_> = ignored.iter().map(|i| i.param).collect();
    assert_eq!(names, ["page", "ageRange"]);
  }

  #[test]
  fn ranges_parse_as_pairs() {
    let (q, ignored) = RawSalesParams {
      age_range: Some("30, 20".into()),
      date_range: Some("2023-01-01,2023-01-31".into()),
      ..raw()
    }
    .into_descriptor();
    // Validity of the age interval is decided by the filter compiler.
    assert_eq!(q.age_range, Some((30, 20)));
    assert_eq!(
      q.date_range,
      Some(("2023-01-01".to_owned(), "2023-01-31".to_owned()))
    );
    assert!(ignored.is_empty());
  }

  #[test]
  fn one_sided_ranges_are_ignored() {
    let (q, ignored) = RawSalesParams {
      age_range: Some("18".into()),
      date_range: Some("2023-01-01,".into()),
      ..raw()
    }
    .into_descriptor();
    assert_eq!(q.age_range, None);
    assert_eq!(q.date_range, None);
    assert_eq!(ignored.len(), 2);
  }
}
