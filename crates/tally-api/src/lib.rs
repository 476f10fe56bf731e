//! JSON REST API for the Tally sales dashboard.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::SalesRepository`].
//! Transport concerns (binding, CORS, tracing layers) are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(repo.clone(), ApiOptions::default()))
//! ```

pub mod error;
pub mod sales;

use std::sync::Arc;

use axum::{Router, routing::get};
use tally_core::{SalesRepository, query::IgnoredParam};

pub use error::ApiError;

/// Behaviour switches for the API layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiOptions {
  /// Include an `ignoredParams` array in responses when any parameter was
  /// dropped.
  pub report_ignored_params: bool,
}

impl ApiOptions {
  fn report(&self, ignored: Vec<IgnoredParam>) -> Option<Vec<IgnoredParam>> {
    (self.report_ignored_params && !ignored.is_empty()).then_some(ignored)
  }
}

/// Shared handler state.
pub struct ApiState<R> {
  pub repo:    Arc<R>,
  pub options: ApiOptions,
}

impl<R> Clone for ApiState<R> {
  fn clone(&self) -> Self { Self { repo: Arc::clone(&self.repo), options: self.options } }
}

/// Build a fully-materialised API router for `repo`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R>(repo: Arc<R>, options: ApiOptions) -> Router<()>
where
  R: SalesRepository + 'static,
{
  Router::new()
    .route("/sales", get(sales::list::<R>))
    .route("/sales/metrics", get(sales::metrics::<R>))
    .with_state(ApiState { repo, options })
}
