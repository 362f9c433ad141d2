//! Native-load table readers.
//!
//! ERCOT publishes hourly native load as one workbook per year with an
//! `Hour Ending` column, one column per weather zone and an `ERCOT` system
//! total. Columns that are not zone codes (the total included) are ignored.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use csv::{ReaderBuilder, Trim};

use super::{IngestError, parse_mw};
use crate::model::RawObservation;
use crate::zones::ZoneCode;

pub const HOUR_ENDING_COLUMN: &str = "Hour Ending";

/// Where the hour label and each zone live in a header row.
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    hour_col: usize,
    zone_cols: Vec<(usize, ZoneCode)>,
}

impl Layout {
    fn from_headers<'a, I>(headers: I, path: &Path) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut hour_col = None;
        let mut zone_cols = Vec::new();

        for (idx, header) in headers.into_iter().enumerate() {
            let header = header.trim();
            if header.eq_ignore_ascii_case(HOUR_ENDING_COLUMN) {
                hour_col = Some(idx);
            } else if let Some(zone) = ZoneCode::from_code(header) {
                zone_cols.push((idx, zone));
            }
        }

        let hour_col = hour_col.ok_or_else(|| IngestError::MissingColumn {
            path: path.display().to_string(),
            column: HOUR_ENDING_COLUMN.to_string(),
        })?;
        if zone_cols.is_empty() {
            return Err(IngestError::MissingColumn {
                path: path.display().to_string(),
                column: "<zone code>".to_string(),
            });
        }

        Ok(Self { hour_col, zone_cols })
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Reads a native-load CSV export.
pub fn load_csv(path: &Path) -> Result<Vec<RawObservation>, IngestError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let layout = Layout::from_headers(reader.headers()?.iter(), path)?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Row numbers in errors are 1-based and count the header.
        let row_number = i + 2;

        let label = record.get(layout.hour_col).unwrap_or_default();
        if label.is_empty() {
            continue;
        }

        let mut observation = RawObservation::new(label);
        for &(idx, zone) in &layout.zone_cols {
            let cell = record.get(idx).unwrap_or_default();
            let mw = parse_mw(cell).map_err(|_| IngestError::InvalidValue {
                path: path.display().to_string(),
                row: row_number,
                column: zone.code().to_string(),
                value: cell.to_string(),
            })?;
            if let Some(mw) = mw {
                observation = observation.with_power(zone, mw);
            }
        }
        rows.push(observation);
    }

    Ok(rows)
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

/// Reads the first worksheet of a native-load workbook.
///
/// The first non-empty row is taken as the header. Hour labels are expected
/// as text cells; any other cell type is passed on as its display string and
/// will fail normalization if it is not a valid label.
pub fn load_xlsx(path: &Path) -> Result<Vec<RawObservation>, IngestError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet_names = workbook.sheet_names().to_vec();
    let first_sheet = sheet_names.first().ok_or_else(|| IngestError::EmptyWorkbook {
        path: path.display().to_string(),
    })?;
    let range = workbook.worksheet_range(first_sheet)?;

    let mut rows_iter = range
        .rows()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(|cell| matches!(cell, Data::Empty)));

    let (_, header_row) = rows_iter.next().ok_or_else(|| IngestError::EmptyWorkbook {
        path: path.display().to_string(),
    })?;
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();
    let layout = Layout::from_headers(headers.iter().map(String::as_str), path)?;

    let mut rows = Vec::new();
    for (row_idx, row) in rows_iter {
        let label = row.get(layout.hour_col).map(cell_text).unwrap_or_default();
        if label.trim().is_empty() {
            continue;
        }

        let mut observation = RawObservation::new(label.trim());
        for &(idx, zone) in &layout.zone_cols {
            let cell = row.get(idx).unwrap_or(&Data::Empty);
            let mw = cell_mw(cell).map_err(|_| IngestError::InvalidValue {
                path: path.display().to_string(),
                row: row_idx + 1,
                column: zone.code().to_string(),
                value: cell_text(cell),
            })?;
            if let Some(mw) = mw {
                observation = observation.with_power(zone, mw);
            }
        }
        rows.push(observation);
    }

    Ok(rows)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_mw(cell: &Data) -> Result<Option<f64>, ()> {
    match cell {
        Data::Float(v) if v.is_finite() => Ok(Some(*v)),
        Data::Int(v) => Ok(Some(*v as f64)),
        Data::String(s) => parse_mw(s),
        Data::Empty => Ok(None),
        _ => Err(()),
    }
}
