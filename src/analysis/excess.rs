//! Excess-capacity bands.
//!
//! For each hourly group the spare headroom is measured against the zone's
//! peak for that month: the mean reading gives the typical headroom, mean ±
//! one standard deviation gives a band around it, and the group's min/max
//! give the historical extremes.

use std::collections::HashMap;

use crate::model::{AnalysisError, ExcessBand, HourlyStat, MonthlyPeak};
use crate::zones::ZoneCode;

/// Computes one `ExcessBand` per `HourlyStat`, in input order.
///
/// Each stat must have a matching `(zone, month)` peak, otherwise the whole
/// computation fails with `MissingPeak`. A NaN `stddev` carries through to
/// the ±std fields.
pub fn compute_excess(
    stats: &[HourlyStat],
    peaks: &[MonthlyPeak],
) -> Result<Vec<ExcessBand>, AnalysisError> {
    let peak_by_month: HashMap<(ZoneCode, u32), f64> = peaks
        .iter()
        .map(|p| ((p.zone, p.month), p.peak_mw))
        .collect();

    stats
        .iter()
        .map(|stat| -> Result<ExcessBand, AnalysisError> {
            let peak = peak_by_month
                .get(&(stat.zone, stat.month))
                .copied()
                .ok_or(AnalysisError::MissingPeak { zone: stat.zone, month: stat.month })?;
            Ok(excess_band(stat, peak))
        })
        .collect()
}

/// Applies the excess formulas to a single stat against `peak_mw`.
pub fn excess_band(stat: &HourlyStat, peak_mw: f64) -> ExcessBand {
    let mean_excess = peak_mw - stat.mean;
    ExcessBand {
        zone: stat.zone,
        month: stat.month,
        hour: stat.hour,
        mean_excess,
        mean_excess_plus_std: mean_excess + stat.stddev,
        mean_excess_minus_std: mean_excess - stat.stddev,
        max_excess: peak_mw - stat.min,
        min_excess: peak_mw - stat.max,
    }
}
