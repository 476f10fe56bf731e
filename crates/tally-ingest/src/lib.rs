//! Sales dataset loader for Tally.
//!
//! Reads the tabular source (CSV with a header row) and normalises each row
//! into a [`tally_core::SalesRecord`]. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let loaded = tally_ingest::load_csv("dataset.csv").unwrap();
//! println!("{} records, {} skipped", loaded.records.len(), loaded.skipped);
//! ```

pub mod error;
pub mod normalize;

use std::{fs::File, io::Read, path::Path};

pub use error::{Error, Result};
pub use normalize::{RawSalesRow, normalize};
use tally_core::SalesRecord;
use tracing::{info, warn};

/// The outcome of loading a dataset.
#[derive(Debug, Default)]
pub struct Loaded {
  /// Normalised records, in source order.
  pub records: Vec<SalesRecord>,
  /// Rows that could not be decoded or normalised.
  pub skipped: usize,
}

/// Read every row from `reader`.
///
/// A row that fails to decode or normalise is logged and skipped without
/// aborting the rest; only I/O failures are returned as errors.
pub fn read_csv<R: Read>(reader: R) -> Result<Loaded> {
  let mut source = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(true)
    .from_reader(reader);

  let mut loaded = Loaded::default();
  for (index, row) in source.deserialize::<RawSalesRow>().enumerate() {
    let row = match row {
      Ok(row) => row,
      Err(e) if e.is_io_error() => return Err(e.into()),
      Err(e) => {
        warn!(row = index + 1, error = %e, "skipping undecodable row");
        loaded.skipped += 1;
        continue;
      }
    };
    match normalize(row) {
      Ok(record) => loaded.records.push(record),
      Err(e) => {
        warn!(row = index + 1, error = %e, "skipping row");
        loaded.skipped += 1;
      }
    }
  }

  Ok(loaded)
}

/// Open `path` and [`read_csv`] it.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Loaded> {
  let path = path.as_ref();
  let loaded = read_csv(File::open(path)?)?;
  info!(
    path = %path.display(),
    records = loaded.records.len(),
    skipped = loaded.skipped,
    "loaded sales dataset"
  );
  Ok(loaded)
}
