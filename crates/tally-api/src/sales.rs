//! Handlers for `GET /sales` and `GET /sales/metrics`.
//!
//! Query parameters are read as raw pairs and folded into
//! [`RawSalesParams`], so a malformed value never turns into a 400. Values
//! that cannot be interpreted are dropped by
//! [`RawSalesParams::into_descriptor`] and logged.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Serialize;
use tally_core::{
  MetricsSummary, QueryDescriptor, RawSalesParams, ResultEnvelope, SalesRepository,
  filter::CompiledFilter,
  query::IgnoredParam,
};
use tracing::debug;

use crate::{ApiState, error::ApiError};

/// Added to a list response when nothing matched.
pub const NO_RESULTS_MESSAGE: &str = "No results found matching your criteria.";

/// Body of `GET /sales`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesResponse {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:        Option<&'static str>,
  #[serde(flatten)]
  pub envelope:       ResultEnvelope,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ignored_params: Option<Vec<IgnoredParam>>,
}

/// Body of `GET /sales/metrics`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
  #[serde(flatten)]
  pub metrics:        MetricsSummary,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ignored_params: Option<Vec<IgnoredParam>>,
}

/// `GET /sales[?search=..][&regions=..][&sortBy=..][&page=..]...`
pub async fn list<R>(
  State(state): State<ApiState<R>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SalesResponse>, ApiError>
where
  R: SalesRepository + 'static,
{
  let (query, ignored) = descriptor(pairs);
  let envelope = state.repo.query(&query).await.map_err(ApiError::repository)?;

  let message = (envelope.total_records == 0).then_some(NO_RESULTS_MESSAGE);
  Ok(Json(SalesResponse {
    message,
    envelope,
    ignored_params: state.options.report(ignored),
  }))
}

/// `GET /sales/metrics` returns totals for the same filter parameters as
/// [`list`]; sort and paging parameters are accepted and have no effect.
pub async fn metrics<R>(
  State(state): State<ApiState<R>>,
  Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<MetricsResponse>, ApiError>
where
  R: SalesRepository + 'static,
{
  let (query, ignored) = descriptor(pairs);
  let metrics = state.repo.aggregate(&query).await.map_err(ApiError::repository)?;

  Ok(Json(MetricsResponse { metrics, ignored_params: state.options.report(ignored) }))
}

fn descriptor(pairs: Vec<(String, String)>) -> (QueryDescriptor, Vec<IgnoredParam>) {
  let (query, mut ignored) = collect_params(pairs).into_descriptor();
  // Range bounds are validated when the filter is compiled, and the
  // repository compiles its own copy. This extra pass only collects those
  // diagnostics; its filter is discarded.
  ignored.extend(CompiledFilter::compile(&query).ignored);
  for param in &ignored {
    debug!(%param, "ignoring query parameter");
  }
  (query, ignored)
}

/// Fold query-string pairs into [`RawSalesParams`].
///
/// A repeated multi-value key is joined with commas, so
/// `regions=North&regions=South` reads as `regions=North,South`. For other
/// keys the last occurrence wins. Unknown keys are skipped.
pub fn collect_params(pairs: Vec<(String, String)>) -> RawSalesParams {
  let mut raw = RawSalesParams::default();
  for (key, value) in pairs {
    match key.as_str() {
      "search" => raw.search = Some(value),
      "page" => raw.page = Some(value),
      "pageSize" => raw.page_size = Some(value),
      "sortBy" => raw.sort_by = Some(value),
      "sortOrder" => raw.sort_order = Some(value),
      "ageRange" => raw.age_range = Some(value),
      "dateRange" => raw.date_range = Some(value),
      "regions" => append(&mut raw.regions, value),
      "genders" => append(&mut raw.genders, value),
      "categories" => append(&mut raw.categories, value),
      "tags" => append(&mut raw.tags, value),
      "paymentMethods" => append(&mut raw.payment_methods, value),
      _ => debug!(param = %key, "unknown query parameter"),
    }
  }
  raw
}

fn append(slot: &mut Option<String>, value: String) {
  match slot {
    Some(list) => {
      list.push(',');
      list.push_str(&value);
    }
    None => *slot = Some(value),
  }
}
