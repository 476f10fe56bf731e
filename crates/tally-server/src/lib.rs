//! HTTP server assembly for Tally.
//!
//! Holds the runtime configuration and builds the top-level axum [`Router`]:
//! a liveness route at `/`, the JSON API under `/api`, request tracing and
//! optional CORS.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Router,
  http::{HeaderValue, Method},
  routing::get,
};
use serde::Deserialize;
use tally_api::ApiOptions;
use tally_core::{SalesRepository, query::DEFAULT_PAGE_SIZE};
use tower_http::{
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};
use tracing::warn;

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Tally sales API is running.";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`SalesRepository`] backs the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
  /// Load the CSV dataset into memory at startup.
  #[default]
  Memory,
  /// Query a pre-imported SQLite store.
  Sqlite,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub storage:               StorageKind,
  pub dataset_path:          PathBuf,
  pub store_path:            PathBuf,
  pub default_page_size:     u64,
  /// Origins allowed by CORS; empty disables the CORS layer.
  pub cors_origins:          Vec<String>,
  pub report_ignored_params: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  5000,
      storage:               StorageKind::Memory,
      dataset_path:          PathBuf::from("dataset.csv"),
      store_path:            PathBuf::from("tally.db"),
      default_page_size:     DEFAULT_PAGE_SIZE,
      cors_origins:          Vec::new(),
      report_ignored_params: false,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay `TALLY_*` environment variables.
  /// `TALLY_CORS_ORIGINS` is split on commas.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TALLY")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_options(&self) -> ApiOptions {
    ApiOptions { report_ignored_params: self.report_ignored_params }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`] around `repo`.
pub fn router<R>(repo: Arc<R>, config: &ServerConfig) -> Router
where
  R: SalesRepository + 'static,
{
  let app = Router::new()
    .route("/", get(liveness))
    .nest("/api", tally_api::api_router(repo, config.api_options()))
    .layer(TraceLayer::new_for_http());

  match cors_layer(&config.cors_origins) {
    Some(cors) => app.layer(cors),
    None => app,
  }
}

async fn liveness() -> &'static str { LIVENESS_MESSAGE }

/// A read-only CORS policy for `origins`, or `None` when no valid origin is
/// configured.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
  let allowed: Vec<HeaderValue> = origins
    .iter()
    .map(|o| o.trim())
    .filter(|o| !o.is_empty())
    .filter_map(|o| match HeaderValue::from_str(o) {
      Ok(v) => Some(v),
      Err(_) => {
        warn!(origin = o, "ignoring invalid CORS origin");
        None
      }
    })
    .collect();

  (!allowed.is_empty()).then(|| {
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(allowed))
      .allow_methods([Method::GET])
  })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use tally_core::{InMemoryRepository, SalesRecord};
  use tower::ServiceExt;

  use super::*;

  fn app(config: &ServerConfig) -> Router {
    let day = "2024-02-29".parse().unwrap();
    let repo = InMemoryRepository::new(vec![SalesRecord::new("T1", day)]);
    router(Arc::new(repo), config)
  }

  async fn send(app: Router, req: Request<Body>) -> axum::response::Response {
    app.oneshot(req).await.unwrap()
  }

  #[test]
  fn missing_config_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/tally.toml")).unwrap();
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.storage, StorageKind::Memory);
    assert_eq!(cfg.default_page_size, 10);
    assert!(cfg.cors_origins.is_empty());
    assert!(!cfg.report_ignored_params);
  }

  #[test]
  fn storage_kind_parses_lowercase() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("storage", "sqlite")
      .unwrap()
      .set_override("port", 8080)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.storage, StorageKind::Sqlite);
    assert_eq!(cfg.address(), "127.0.0.1:8080");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/tally.db")), PathBuf::from(home).join("tally.db"));
    assert_eq!(expand_tilde(Path::new("data/tally.db")), PathBuf::from("data/tally.db"));
  }

  #[tokio::test]
  async fn root_reports_liveness() {
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = send(app(&ServerConfig::default()), req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], LIVENESS_MESSAGE.as_bytes());
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let req = Request::builder().uri("/api/sales").body(Body::empty()).unwrap();
    let resp = send(app(&ServerConfig::default()), req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["totalRecords"], 1);
    assert_eq!(body["data"][0]["transactionId"], "T1");
  }

  #[tokio::test]
  async fn cors_header_only_when_configured() {
    let origin = "http://localhost:3000";
    let request = || {
      Request::builder()
        .uri("/api/sales")
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
    };

    let resp = send(app(&ServerConfig::default()), request()).await;
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

    let config = ServerConfig { cors_origins: vec![origin.into()], ..Default::default() };
    let resp = send(app(&config), request()).await;
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], origin);
  }
}
