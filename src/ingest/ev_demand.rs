//! EV charging demand curves.
//!
//! Each zone with projected EV demand has a file named
//! `daily_ev_load_<alias>.csv` (e.g. `daily_ev_load_far_west.csv`) holding
//! 24 rows, one per hour of the day:
//!
//! ```text
//! Hours,Midland Center,Odessa Center,Total (MW)
//! 0,1.2,0.8,2.0
//! ...
//! ```
//!
//! Every column other than `Hours` is a charging center, except the one whose
//! header contains `(MW)`, which is the zone total. A file with two such
//! columns is rejected. Row `i` must be hour `i`
//! so the curve lines up with the `hour` field of the excess bands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::Serialize;

use super::{IngestError, parse_mw};
use crate::logging::{self, Stage};
use crate::zones::ZoneCode;

pub const FILE_PREFIX: &str = "daily_ev_load_";
pub const FILE_SUFFIX: &str = ".csv";
pub const HOURS_COLUMN: &str = "Hours";
pub const TOTAL_MARKER: &str = "(MW)";
pub const HOURS_PER_DAY: usize = 24;

/// One named column of hourly demand, `hourly_mw[h]` for hour `h`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandColumn {
    pub name: String,
    pub hourly_mw: Vec<f64>,
}

/// Projected daily EV charging demand for a zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvDemandCurve {
    pub zone: ZoneCode,
    pub centers: Vec<DemandColumn>,
    /// Zone total, label stripped of the `(MW)` suffix.
    pub total: Option<DemandColumn>,
}

impl EvDemandCurve {
    /// Total demand at `hour`: the total column when present, otherwise the
    /// sum of the centers.
    pub fn total_at(&self, hour: u32) -> Option<f64> {
        let h = usize::try_from(hour).ok()?;
        match &self.total {
            Some(total) => total.hourly_mw.get(h).copied(),
            None if self.centers.is_empty() => None,
            None => self
                .centers
                .iter()
                .map(|c| c.hourly_mw.get(h).copied())
                .sum::<Option<f64>>(),
        }
    }
}

// ---------------------------------------------------------------------------
// File name resolution
// ---------------------------------------------------------------------------

/// Resolves the zone from a `daily_ev_load_<alias>.csv` file name.
/// Returns `None` for any other name or an unknown alias.
pub fn zone_from_filename(path: &Path) -> Option<ZoneCode> {
    let name = path.file_name()?.to_str()?;
    let alias = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    ZoneCode::from_alias(alias)
}

/// Path of the demand file for `zone` inside `dir`.
pub fn curve_path(dir: &Path, zone: ZoneCode) -> PathBuf {
    dir.join(format!("{}{}{}", FILE_PREFIX, zone.alias(), FILE_SUFFIX))
}

/// Lists the demand files in `dir`, sorted by zone. Files that match the
/// naming pattern but carry an unknown alias are skipped with a warning.
pub fn discover_ev_curves(dir: &Path) -> Result<Vec<(ZoneCode, PathBuf)>, IngestError> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)) {
            continue;
        }

        match zone_from_filename(&path) {
            Some(zone) => found.push((zone, path)),
            None => logging::warn(
                Stage::Ingest,
                None,
                &format!("skipping {}: unknown zone alias", path.display()),
            ),
        }
    }

    found.sort();
    Ok(found)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Reads a demand file whose zone is resolved from its name.
pub fn load_ev_curve(path: &Path) -> Result<EvDemandCurve, IngestError> {
    let zone = zone_from_filename(path)
        .ok_or_else(|| IngestError::UnrecognizedFile(path.display().to_string()))?;
    load_ev_curve_for_zone(path, zone)
}

/// Reads a demand file for an already-resolved zone.
pub fn load_ev_curve_for_zone(path: &Path, zone: ZoneCode) -> Result<EvDemandCurve, IngestError> {
    let path_str = path.display().to_string();
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let headers = reader.headers()?.clone();

    let hours_col = headers
        .iter()
        .position(|h| h == HOURS_COLUMN)
        .ok_or_else(|| IngestError::MissingColumn {
            path: path_str.clone(),
            column: HOURS_COLUMN.to_string(),
        })?;

    let mut columns: Vec<(usize, String, Vec<f64>)> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != hours_col)
        .map(|(idx, name)| (idx, name.to_string(), Vec::with_capacity(HOURS_PER_DAY)))
        .collect();

    let mut totals = columns
        .iter()
        .map(|(_, name, _)| name)
        .filter(|name| name.contains(TOTAL_MARKER));
    if let (Some(first), Some(second)) = (totals.next(), totals.next()) {
        return Err(IngestError::DuplicateTotal {
            path: path_str,
            first: first.clone(),
            second: second.clone(),
        });
    }

    let mut row_count = 0usize;
    for record in reader.records() {
        let record = record?;
        let row = row_count;
        row_count += 1;
        if row_count > HOURS_PER_DAY {
            continue;
        }

        let hour_cell = record.get(hours_col).unwrap_or_default();
        if hour_cell.parse::<f64>().ok() != Some(row as f64) {
            return Err(IngestError::HourMisaligned {
                path: path_str,
                row,
                found: hour_cell.to_string(),
            });
        }

        for (idx, name, values) in &mut columns {
            let cell = record.get(*idx).unwrap_or_default();
            let value = match parse_mw(cell) {
                Ok(Some(v)) => v,
                _ => {
                    return Err(IngestError::InvalidValue {
                        path: path_str,
                        row: row + 2,
                        column: name.clone(),
                        value: cell.to_string(),
                    });
                }
            };
            values.push(value);
        }
    }

    if row_count != HOURS_PER_DAY {
        return Err(IngestError::WrongRowCount {
            path: path_str,
            expected: HOURS_PER_DAY,
            found: row_count,
        });
    }

    let mut centers = Vec::new();
    let mut total = None;
    for (_, name, hourly_mw) in columns {
        if name.contains(TOTAL_MARKER) {
            let label = name.replace(TOTAL_MARKER, "").trim().to_string();
            total = Some(DemandColumn { name: label, hourly_mw });
        } else {
            centers.push(DemandColumn { name, hourly_mw });
        }
    }

    Ok(EvDemandCurve { zone, centers, total })
}

/// Discovers and loads every demand curve in `dir`, keyed by zone.
pub fn load_ev_curves(dir: &Path) -> Result<BTreeMap<ZoneCode, EvDemandCurve>, IngestError> {
    let mut curves = BTreeMap::new();
    for (zone, path) in discover_ev_curves(dir)? {
        let curve = load_ev_curve_for_zone(&path, zone)?;
        logging::debug(
            Stage::Ingest,
            Some(zone),
            &format!("EV demand curve with {} centers from {}", curve.centers.len(), path.display()),
        );
        curves.insert(zone, curve);
    }
    Ok(curves)
}
