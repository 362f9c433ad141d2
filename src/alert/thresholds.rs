//! EV demand vs. excess-capacity threshold checks.
//!
//! Each hour of a zone's EV demand curve is compared against that hour's
//! excess band for a given month. The band edges act as thresholds in
//! ascending order of severity:
//!
//!   min_excess <= mean_excess <= max_excess
//!
//! `mean_excess_minus_std` sits between `min_excess` and `mean_excess` for
//! most groups, but falls below `min_excess` whenever `mean + std > max`
//! (any two-reading group, skewed groups). It only counts as a threshold
//! when it is not below `min_excess`.
//!
//! Demand at or below `min_excess` fits even on the highest-load day seen
//! for that hour and raises nothing.

use serde::Serialize;

use crate::ingest::ev_demand::EvDemandCurve;
use crate::model::ExcessBand;
use crate::zones::ZoneCode;

/// Headroom severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HeadroomSeverity {
    /// Exceeds headroom left on the highest-load day on record.
    Watch,
    /// Exceeds the lower edge of the typical band (mean - 1 stddev).
    Tight,
    /// Exceeds the typical (mean) headroom.
    Exceeded,
    /// Exceeds headroom left even on the lowest-load day on record.
    Infeasible,
}

/// Raised when EV demand at one hour eats into the available headroom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadroomAlert {
    pub zone: ZoneCode,
    pub month: u32,
    pub hour: u32,
    pub severity: HeadroomSeverity,
    pub demand_mw: f64,
    /// The band edge that was crossed.
    pub threshold_mw: f64,
    pub message: String,
}

/// Checks a single hour's demand against its band.
///
/// Returns `None` when demand fits under `min_excess`. Comparisons against a
/// NaN edge are false, so a singleton group's undefined std band never
/// triggers `Tight` on its own.
pub fn check_headroom(band: &ExcessBand, demand_mw: f64) -> Option<HeadroomAlert> {
    if demand_mw <= band.min_excess {
        return None;
    }

    let levels = [
        (HeadroomSeverity::Infeasible, band.max_excess, "max excess"),
        (HeadroomSeverity::Exceeded, band.mean_excess, "mean excess"),
        (HeadroomSeverity::Tight, band.mean_excess_minus_std, "mean excess - std"),
        (HeadroomSeverity::Watch, band.min_excess, "min excess"),
    ];

    let (severity, threshold_mw, edge) = levels
        .into_iter()
        .filter(|(severity, threshold, _)| {
            *severity != HeadroomSeverity::Tight || *threshold >= band.min_excess
        })
        .find(|(_, threshold, _)| demand_mw > *threshold)?;

    Some(HeadroomAlert {
        zone: band.zone,
        month: band.month,
        hour: band.hour,
        severity,
        demand_mw,
        threshold_mw,
        message: format!(
            "{} month {} hour {:02}: EV demand {:.1} MW exceeds {} ({:.1} MW)",
            band.zone, band.month, band.hour, demand_mw, edge, threshold_mw
        ),
    })
}

/// Checks every band of `curve.zone` against the curve's total demand.
/// Bands for other zones and hours the curve does not cover are skipped.
pub fn assess_ev_demand(bands: &[ExcessBand], curve: &EvDemandCurve) -> Vec<HeadroomAlert> {
    bands
        .iter()
        .filter(|band| band.zone == curve.zone)
        .filter_map(|band| {
            let demand = curve.total_at(band.hour)?;
            check_headroom(band, demand)
        })
        .collect()
}
