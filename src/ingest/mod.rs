//! File loaders feeding the analysis engine.
//!
//! The engine itself never touches the filesystem. This module turns the
//! files found in a data directory into the in-memory inputs it consumes:
//!
//! - `native_load`: hourly zone load tables (CSV or XLSX) into `RawObservation`s.
//! - `ev_demand`: `daily_ev_load_<alias>.csv` curves into `EvDemandCurve`s,
//!   with the zone resolved from the file name.

pub mod ev_demand;
pub mod native_load;

use std::path::Path;

use thiserror::Error;

use crate::logging::{self, Stage};
use crate::model::RawObservation;

pub use native_load::{load_csv, load_xlsx};

/// Errors raised while reading input files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{path}: no worksheet with a header row")]
    EmptyWorkbook { path: String },

    #[error("{path}: missing required column {column:?}")]
    MissingColumn { path: String, column: String },

    #[error("{path}: row {row}, column {column:?}: invalid value {value:?}")]
    InvalidValue {
        path: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{path}: expected {expected} hourly rows, found {found}")]
    WrongRowCount {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("{path}: row {row} is labelled hour {found:?}, expected {row}")]
    HourMisaligned {
        path: String,
        row: usize,
        found: String,
    },

    #[error("{path}: more than one total column ({first:?}, {second:?})")]
    DuplicateTotal {
        path: String,
        first: String,
        second: String,
    },

    #[error("cannot resolve zone from file name {0:?}")]
    UnrecognizedFile(String),
}

/// Loads a native-load table, choosing the reader by file extension.
pub fn load_raw_file(path: &Path) -> Result<Vec<RawObservation>, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let rows = match extension.as_str() {
        "csv" => load_csv(path)?,
        "xlsx" | "xlsm" => load_xlsx(path)?,
        _ => return Err(IngestError::UnsupportedFormat(path.display().to_string())),
    };

    logging::info(
        Stage::Ingest,
        None,
        &format!("loaded {} rows from {}", rows.len(), path.display()),
    );
    Ok(rows)
}

/// Loads every file in order, one batch per file.
pub fn load_raw_batches<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Vec<RawObservation>>, IngestError> {
    paths.iter().map(|p| load_raw_file(p.as_ref())).collect()
}

/// Parses a numeric cell. Thousands separators are tolerated; an empty cell
/// is `None` (zone not reported for this hour). `NaN` and infinities are
/// rejected.
pub(crate) fn parse_mw(raw: &str) -> Result<Option<f64>, ()> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Ok(None);
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}
