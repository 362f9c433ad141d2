//! Approximate nameplate capacity per zone.
//!
//! The estimate is the highest load ever observed for the zone across the
//! whole series. The excess bands are measured against the *monthly* peak
//! instead (see `groupings::monthly_peaks`); this value is reported
//! alongside them for reference.

use crate::model::{AnalysisError, NormalizedSeries, ZoneCapacity};
use crate::zones::ZoneCode;

/// Returns the maximum power recorded for `zone` anywhere in `series`.
///
/// Fails with `EmptySeries` when there are no records at all, and with
/// `MissingZone` when records exist but none reports `zone`.
pub fn estimate_capacity(
    series: &NormalizedSeries,
    zone: ZoneCode,
) -> Result<ZoneCapacity, AnalysisError> {
    if series.is_empty() {
        return Err(AnalysisError::EmptySeries);
    }

    let capacity_mw = series
        .zone_values(zone)
        .map(|(_, mw)| mw)
        .reduce(f64::max)
        .ok_or(AnalysisError::MissingZone(zone))?;

    Ok(ZoneCapacity { zone, capacity_mw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::normalize;
    use crate::model::RawObservation;

    #[test]
    fn test_capacity_is_global_maximum() {
        let series = normalize(vec![
            RawObservation::new("01/01/2023 01:00").with_power(ZoneCode::East, 900.0),
            RawObservation::new("07/15/2023 17:00").with_power(ZoneCode::East, 1450.5),
            RawObservation::new("12/01/2023 08:00").with_power(ZoneCode::East, 1100.0),
        ])
        .unwrap();

        let capacity = estimate_capacity(&series, ZoneCode::East).unwrap();
        assert_eq!(capacity.zone, ZoneCode::East);
        assert_eq!(capacity.capacity_mw, 1450.5);
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let series = normalize(Vec::new()).unwrap();
        assert_eq!(
            estimate_capacity(&series, ZoneCode::East),
            Err(AnalysisError::EmptySeries)
        );
    }

    #[test]
    fn test_zone_absent_from_every_record_is_an_error() {
        let series = normalize(vec![
            RawObservation::new("01/01/2023 01:00").with_power(ZoneCode::Coast, 10_000.0),
        ])
        .unwrap();
        assert_eq!(
            estimate_capacity(&series, ZoneCode::West),
            Err(AnalysisError::MissingZone(ZoneCode::West))
        );
    }

    #[test]
    fn test_zone_reported_in_some_records_only() {
        let series = normalize(vec![
            RawObservation::new("01/01/2023 01:00").with_power(ZoneCode::Coast, 10_000.0),
            RawObservation::new("01/01/2023 02:00")
                .with_power(ZoneCode::Coast, 9_000.0)
                .with_power(ZoneCode::West, 1_200.0),
        ])
        .unwrap();
        assert_eq!(estimate_capacity(&series, ZoneCode::West).unwrap().capacity_mw, 1_200.0);
    }
}
