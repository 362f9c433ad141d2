//! Grouping of a zone's hourly load by (month, hour-of-day).
//!
//! Multi-year data is folded together: every January 05:00 reading from
//! every year lands in the same group. Groups are only created for keys that
//! have at least one observation, so a month with no data simply has no
//! entries downstream.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};

use crate::logging::{self, Stage};
use crate::model::{HourlyStat, MonthlyPeak, NormalizedSeries};
use crate::zones::ZoneCode;

/// `(month 1..=12, hour 0..=23)`
pub type GroupKey = (u32, u32);

/// Immutable mapping from `(month, hour)` to the zone's readings in that
/// slot, in series order. Iteration is month ascending, then hour ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyGroups {
    zone: ZoneCode,
    groups: BTreeMap<GroupKey, Vec<f64>>,
}

impl HourlyGroups {
    pub fn build(series: &NormalizedSeries, zone: ZoneCode) -> Self {
        let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
        for (timestamp, mw) in series.zone_values(zone) {
            groups
                .entry((timestamp.month(), timestamp.hour()))
                .or_default()
                .push(mw);
        }
        Self { zone, groups }
    }

    pub fn zone(&self) -> ZoneCode {
        self.zone
    }

    pub fn get(&self, month: u32, hour: u32) -> Option<&[f64]> {
        self.groups.get(&(month, hour)).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupKey, &[f64])> + '_ {
        self.groups.iter().map(|(key, values)| (*key, values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Descriptive statistics for every non-empty group.
    pub fn stats(&self) -> Vec<HourlyStat> {
        self.iter()
            .map(|((month, hour), values)| {
                let summary = Summary::of(values);
                HourlyStat {
                    zone: self.zone,
                    month,
                    hour,
                    mean: summary.mean,
                    min: summary.min,
                    max: summary.max,
                    stddev: summary.stddev,
                }
            })
            .collect()
    }

    /// Per-month maximum over all hours of that month.
    pub fn monthly_peaks(&self) -> Vec<MonthlyPeak> {
        let mut peaks: BTreeMap<u32, f64> = BTreeMap::new();
        for ((month, _), values) in self.iter() {
            let group_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            peaks
                .entry(month)
                .and_modify(|peak| *peak = peak.max(group_max))
                .or_insert(group_max);
        }
        peaks
            .into_iter()
            .map(|(month, peak_mw)| MonthlyPeak { zone: self.zone, month, peak_mw })
            .collect()
    }
}

/// Statistics for one (zone, month, hour) group, month then hour ascending.
pub fn aggregate(series: &NormalizedSeries, zone: ZoneCode) -> Vec<HourlyStat> {
    let groups = HourlyGroups::build(series, zone);
    logging::debug(
        Stage::Aggregate,
        Some(zone),
        &format!("{} (month, hour) groups from {} records", groups.len(), series.len()),
    );
    groups.stats()
}

/// Monthly peak load for `zone`, one entry per month with data.
pub fn monthly_peaks(series: &NormalizedSeries, zone: ZoneCode) -> Vec<MonthlyPeak> {
    HourlyGroups::build(series, zone).monthly_peaks()
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Summary {
    mean: f64,
    min: f64,
    max: f64,
    stddev: f64,
}

impl Summary {
    /// `values` is never empty: groups only exist once a value is pushed.
    fn of(values: &[f64]) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Sample standard deviation (n - 1); undefined for a single value.
        let stddev = if values.len() < 2 {
            f64::NAN
        } else {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (n - 1.0)).sqrt()
        };

        Self { mean, min, max, stddev }
    }
}
