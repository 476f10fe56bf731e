//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Body returned for every repository failure; the cause is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str =
  "An internal server error occurred while processing the request.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("repository error: {0}")]
  Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn repository(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Repository(Box::new(e))
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match &self {
      ApiError::Repository(e) => {
        tracing::error!(error = %e, "sales query failed");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "message": INTERNAL_ERROR_MESSAGE })),
        )
          .into_response()
      }
    }
  }
}
