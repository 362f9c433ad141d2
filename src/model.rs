//! Core data types for the zone excess-capacity engine.
//!
//! This module defines the shared domain model imported by all other modules:
//! raw load rows as they arrive from a loader, the normalized hourly series,
//! and the per-group statistics and excess bands derived from it.
//! It contains no logic beyond accessors and the series invariants.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::zones::ZoneCode;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One row of a native-load table, before any timestamp repair.
///
/// `hour_label` is kept verbatim: it may end in "24:00" or carry a DST
/// marker, both of which are handled by `analysis::normalize`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub hour_label: String,
    /// Megawatts per zone. A zone missing from the source row is absent here.
    pub zone_power: BTreeMap<ZoneCode, f64>,
}

impl RawObservation {
    pub fn new(hour_label: impl Into<String>) -> Self {
        Self {
            hour_label: hour_label.into(),
            zone_power: BTreeMap::new(),
        }
    }

    /// Builder-style helper used by loaders and tests.
    pub fn with_power(mut self, zone: ZoneCode, mw: f64) -> Self {
        self.zone_power.insert(zone, mw);
        self
    }
}

// ---------------------------------------------------------------------------
// Normalized series
// ---------------------------------------------------------------------------

/// A single hour of load after timestamp repair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub timestamp: NaiveDateTime,
    pub zone_power: BTreeMap<ZoneCode, f64>,
}

impl NormalizedRecord {
    /// Power for `zone` in this hour, if the source row carried it.
    pub fn power(&self, zone: ZoneCode) -> Option<f64> {
        self.zone_power.get(&zone).copied()
    }
}

/// Chronologically ordered hourly records with unique timestamps.
///
/// The only ways to obtain a series are `analysis::normalize` and
/// [`NormalizedSeries::merge`], both of which enforce the ordering
/// invariant. There is no mutable access once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedSeries {
    records: Vec<NormalizedRecord>,
}

impl NormalizedSeries {
    /// Stable-sorts by timestamp and rejects duplicates.
    pub(crate) fn from_records(mut records: Vec<NormalizedRecord>) -> Result<Self, AnalysisError> {
        records.sort_by_key(|r| r.timestamp);

        if let Some(pair) = records
            .windows(2)
            .find(|pair| pair[0].timestamp == pair[1].timestamp)
        {
            return Err(AnalysisError::DuplicateTimestamp(pair[1].timestamp));
        }

        Ok(Self { records })
    }

    /// Combines two normalized series into one, keeping the ordering
    /// invariant. Overlapping hours are rejected rather than deduplicated.
    pub fn merge(self, other: NormalizedSeries) -> Result<Self, AnalysisError> {
        let mut records = self.records;
        records.extend(other.records);
        Self::from_records(records)
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(timestamp, MW)` pairs for one zone, skipping hours where the zone
    /// was not reported.
    pub fn zone_values(&self, zone: ZoneCode) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.records
            .iter()
            .filter_map(move |r| r.power(zone).map(|mw| (r.timestamp, mw)))
    }
}

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// Approximate nameplate capacity: the highest load ever observed in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneCapacity {
    pub zone: ZoneCode,
    pub capacity_mw: f64,
}

/// Descriptive statistics for one (zone, month, hour-of-day) group.
///
/// `stddev` is the sample standard deviation and is NaN for a group with a
/// single observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyStat {
    pub zone: ZoneCode,
    pub month: u32, // 1..=12
    pub hour: u32,  // 0..=23
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
}

/// Highest load for a zone within one calendar month, across all years and
/// hours. This is the baseline the excess bands are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyPeak {
    pub zone: ZoneCode,
    pub month: u32,
    pub peak_mw: f64,
}

/// Spare headroom below the monthly peak at one hour of the day.
///
/// Fields, in MW:
///   mean_excess           = peak - mean
///   mean_excess_plus_std  = peak - mean + stddev
///   mean_excess_minus_std = peak - mean - stddev
///   max_excess            = peak - min   (lowest historical draw)
///   min_excess            = peak - max   (highest historical draw)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExcessBand {
    pub zone: ZoneCode,
    pub month: u32,
    pub hour: u32,
    pub mean_excess: f64,
    pub mean_excess_plus_std: f64,
    pub mean_excess_minus_std: f64,
    pub max_excess: f64,
    pub min_excess: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Fatal conditions raised by the analysis engine.
///
/// Missing (month, hour) groups and NaN standard deviations are not errors;
/// they show up as absent entries and NaN fields respectively.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// An hour label could not be parsed as `month/day/year hour:minute`.
    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),
    /// Two rows resolved to the same hour after repair.
    #[error("duplicate timestamp: {0}")]
    DuplicateTimestamp(NaiveDateTime),
    /// The series contains no records at all.
    #[error("series is empty")]
    EmptySeries,
    /// No record in the series reports the requested zone.
    #[error("no data for zone {0}")]
    MissingZone(ZoneCode),
    /// Statistics and peaks were derived from inconsistent series.
    #[error("no monthly peak for zone {zone}, month {month}")]
    MissingPeak { zone: ZoneCode, month: u32 },
}
