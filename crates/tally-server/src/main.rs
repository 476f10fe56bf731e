//! Tally server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), builds the
//! configured sales repository, and serves the JSON API over HTTP.
//!
//! # Importing the dataset
//!
//! The SQLite strategy queries a pre-built store. To load the CSV dataset
//! into it:
//!
//! ```text
//! cargo run -p tally-server --bin server -- --import
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use clap::Parser;
use tally_core::InMemoryRepository;
use tally_server::{ServerConfig, StorageKind, expand_tilde};
use tally_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tally sales API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Load the CSV dataset into the SQLite store and exit.
  #[arg(long)]
  import: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let mut cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;
  cfg.dataset_path = expand_tilde(&cfg.dataset_path);
  cfg.store_path = expand_tilde(&cfg.store_path);

  if cli.import {
    return import(&cfg).await;
  }

  let app = match cfg.storage {
    StorageKind::Memory => memory_app(&cfg).await?,
    StorageKind::Sqlite => sqlite_app(&cfg).await?,
  };

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn memory_app(cfg: &ServerConfig) -> anyhow::Result<Router> {
  let loaded = load_dataset(cfg).await?;

  let repo =
    InMemoryRepository::new(loaded.records).with_default_page_size(cfg.default_page_size);
  tracing::info!(records = repo.len(), "serving from memory");
  Ok(tally_server::router(Arc::new(repo), cfg))
}

async fn sqlite_app(cfg: &ServerConfig) -> anyhow::Result<Router> {
  let store = open_store(cfg).await?.with_default_page_size(cfg.default_page_size);
  let records = store.record_count().await.context("failed to count records")?;
  if records == 0 {
    tracing::warn!("store at {:?} is empty; run with --import first", cfg.store_path);
  }
  tracing::info!(records, "serving from sqlite");
  Ok(tally_server::router(Arc::new(store), cfg))
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))
}

/// Populate the SQLite store from the CSV dataset, unless it already holds
/// records.
async fn import(cfg: &ServerConfig) -> anyhow::Result<()> {
  let store = open_store(cfg).await?;
  let existing = store.record_count().await.context("failed to count records")?;
  if existing > 0 {
    tracing::info!(existing, "store already populated; skipping import");
    return Ok(());
  }

  let loaded = load_dataset(cfg).await?;

  let inserted = store.import(loaded.records).await.context("import failed")?;
  tracing::info!(inserted, skipped = loaded.skipped, "import complete");
  Ok(())
}

async fn load_dataset(cfg: &ServerConfig) -> anyhow::Result<tally_ingest::Loaded> {
  let path = cfg.dataset_path.clone();
  tokio::task::spawn_blocking(move || tally_ingest::load_csv(&path))
    .await
    .context("dataset loader panicked")?
    .with_context(|| format!("failed to load dataset at {:?}", cfg.dataset_path))
}
