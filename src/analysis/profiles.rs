//! Daily load curves on the first day of each month.
//!
//! These give a quick look at how a zone's daily shape shifts through the
//! seasons, and are reported next to the EV demand curves for comparison.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;

use crate::model::NormalizedSeries;
use crate::zones::ZoneCode;

/// Load for one zone over one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyProfile {
    pub zone: ZoneCode,
    pub date: NaiveDate,
    /// `(hour, MW)` in chronological order. Hours without a reading are absent.
    pub points: Vec<(u32, f64)>,
}

/// One profile per first-of-month date present in the series, oldest first.
/// With `year` set, only dates in that year are returned.
pub fn first_of_month_profiles(
    series: &NormalizedSeries,
    zone: ZoneCode,
    year: Option<i32>,
) -> Vec<DailyProfile> {
    let mut days: BTreeMap<NaiveDate, Vec<(u32, f64)>> = BTreeMap::new();

    for (timestamp, mw) in series.zone_values(zone) {
        let date = timestamp.date();
        if date.day() != 1 || year.is_some_and(|y| date.year() != y) {
            continue;
        }
        days.entry(date).or_default().push((timestamp.hour(), mw));
    }

    days.into_iter()
        .map(|(date, points)| DailyProfile { zone, date, points })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normalize::normalize;
    use crate::model::RawObservation;

    fn north(label: &str, mw: f64) -> RawObservation {
        RawObservation::new(label).with_power(ZoneCode::North, mw)
    }

    #[test]
    fn test_only_first_of_month_days_are_kept() {
        let series = normalize(vec![
            north("01/01/2023 01:00", 1.0),
            north("01/01/2023 02:00", 2.0),
            north("01/02/2023 01:00", 3.0),
            north("02/01/2023 01:00", 4.0),
        ])
        .unwrap();

        let profiles = first_of_month_profiles(&series, ZoneCode::North, None);
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].points, vec![(1, 1.0), (2, 2.0)]);
        assert_eq!(profiles[1].date, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn test_rolled_midnight_starts_the_first_of_month() {
        // "01/31 24:00" is 00:00 on Feb 1st.
        let series = normalize(vec![north("01/31/2023 24:00", 9.0)]).unwrap();
        let profiles = first_of_month_profiles(&series, ZoneCode::North, None);
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].points, vec![(0, 9.0)]);
    }

    #[test]
    fn test_year_filter() {
        let series = normalize(vec![
            north("03/01/2023 01:00", 1.0),
            north("03/01/2024 01:00", 2.0),
        ])
        .unwrap();
        let profiles = first_of_month_profiles(&series, ZoneCode::North, Some(2024));
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].date.year(), 2024);
    }
}
