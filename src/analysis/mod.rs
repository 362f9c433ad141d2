//! Time-series normalization and excess-capacity analysis.
//!
//! This module holds the computational core. Everything here works on data
//! already in memory; file access lives in `ingest` and output in `report`.
//!
//! Submodules, in pipeline order:
//! - `normalize`: repairs hour labels and builds the `NormalizedSeries`.
//! - `capacity`: global peak per zone (approximate nameplate capacity).
//! - `groupings`: (month, hour) grouping, hourly statistics, monthly peaks.
//! - `excess`: excess-capacity bands against the monthly peak.
//! - `profiles`: first-of-month daily load curves.

pub mod capacity;
pub mod excess;
pub mod groupings;
pub mod normalize;
pub mod profiles;

use crate::logging::{self, Stage};
use crate::model::{AnalysisError, ExcessBand, HourlyStat, MonthlyPeak, NormalizedSeries, ZoneCapacity};
use crate::zones::ZoneCode;

use groupings::HourlyGroups;

/// Everything the engine derives for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneAnalysis {
    pub zone: ZoneCode,
    pub capacity: ZoneCapacity,
    pub hourly_stats: Vec<HourlyStat>,
    pub monthly_peaks: Vec<MonthlyPeak>,
    pub excess_bands: Vec<ExcessBand>,
}

/// Runs capacity estimation, grouping and the excess calculation for `zone`.
///
/// Stats and peaks come from the same `HourlyGroups`, so a `MissingPeak`
/// here would mean a bug in the grouping.
pub fn analyze_zone(series: &NormalizedSeries, zone: ZoneCode) -> Result<ZoneAnalysis, AnalysisError> {
    let capacity = capacity::estimate_capacity(series, zone)?;

    let groups = HourlyGroups::build(series, zone);
    let hourly_stats = groups.stats();
    let monthly_peaks = groups.monthly_peaks();
    logging::debug(
        Stage::Aggregate,
        Some(zone),
        &format!(
            "{} hourly groups over {} months",
            hourly_stats.len(),
            monthly_peaks.len()
        ),
    );

    let excess_bands = excess::compute_excess(&hourly_stats, &monthly_peaks)?;

    logging::info(
        Stage::Excess,
        Some(zone),
        &format!(
            "capacity {:.1} MW, {} excess bands",
            capacity.capacity_mw,
            excess_bands.len()
        ),
    );

    Ok(ZoneAnalysis {
        zone,
        capacity,
        hourly_stats,
        monthly_peaks,
        excess_bands,
    })
}
