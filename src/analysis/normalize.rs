//! Hour-label repair and parsing.
//!
//! ERCOT native-load tables label each row with the hour it *ends*, written
//! as `MM/DD/YYYY HH:MM`. Two quirks need fixing before the labels are usable
//! timestamps:
//!
//! - Midnight is written as `24:00` of the day that just ended. It becomes
//!   `00:00` of the following day.
//! - On the autumn DST transition the repeated hour appears a second time
//!   with a `DST` suffix. Those rows are dropped.
//!
//! Normalization is all-or-nothing: a single unparseable label fails the
//! whole batch.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::logging::{self, Stage};
use crate::model::{AnalysisError, NormalizedRecord, NormalizedSeries, RawObservation};

/// Format of every hour label after repair.
pub const HOUR_LABEL_FORMAT: &str = "%m/%d/%Y %H:%M";

const DATE_FORMAT: &str = "%m/%d/%Y";
const DST_MARKER: &str = "DST";
const END_OF_DAY: &str = "24:00";

/// Returns `true` for rows inserted at the DST fall-back transition.
pub fn is_dst_marker(label: &str) -> bool {
    label.contains(DST_MARKER)
}

/// Rewrites a `... 24:00` label to `00:00` of the next calendar day.
/// Any other label is returned unchanged.
///
/// Returns `MalformedTimestamp` if the date part of a `24:00` label cannot
/// be parsed or the next day overflows the calendar.
pub fn roll_end_of_day(label: &str) -> Result<String, AnalysisError> {
    let Some(date_part) = label.strip_suffix(END_OF_DAY) else {
        return Ok(label.to_string());
    };

    let next_day = NaiveDate::parse_from_str(date_part.trim(), DATE_FORMAT)
        .ok()
        .and_then(|date| date.checked_add_days(Days::new(1)))
        .ok_or_else(|| AnalysisError::MalformedTimestamp(label.to_string()))?;

    Ok(format!("{} 00:00", next_day.format(DATE_FORMAT)))
}

/// Parses a repaired hour label.
pub fn parse_hour_label(label: &str) -> Result<NaiveDateTime, AnalysisError> {
    NaiveDateTime::parse_from_str(label.trim(), HOUR_LABEL_FORMAT)
        .map_err(|_| AnalysisError::MalformedTimestamp(label.to_string()))
}

/// Normalizes a single batch of raw rows.
pub fn normalize(raw: Vec<RawObservation>) -> Result<NormalizedSeries, AnalysisError> {
    normalize_batches(std::iter::once(raw))
}

/// Concatenates several batches (e.g. one per year) in the order given and
/// normalizes the result.
///
/// Rows are stably sorted by their repaired timestamp, so chronologically
/// ordered input keeps its order. Two rows resolving to the same hour are
/// rejected with `DuplicateTimestamp`.
pub fn normalize_batches<I>(batches: I) -> Result<NormalizedSeries, AnalysisError>
where
    I: IntoIterator<Item = Vec<RawObservation>>,
{
    let mut records = Vec::new();
    let mut dropped_dst = 0usize;
    let mut rolled = 0usize;

    for raw in batches.into_iter().flatten() {
        if is_dst_marker(&raw.hour_label) {
            dropped_dst += 1;
            continue;
        }

        let label = roll_end_of_day(&raw.hour_label)?;
        if label != raw.hour_label {
            rolled += 1;
        }

        records.push(NormalizedRecord {
            timestamp: parse_hour_label(&label)?,
            zone_power: raw.zone_power,
        });
    }

    let series = NormalizedSeries::from_records(records)?;

    logging::debug(
        Stage::Normalize,
        None,
        &format!(
            "normalized {} rows ({} DST rows dropped, {} rolled from 24:00)",
            series.len(),
            dropped_dst,
            rolled
        ),
    );

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneCode;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    fn row(label: &str, mw: f64) -> RawObservation {
        RawObservation::new(label).with_power(ZoneCode::Coast, mw)
    }

    // --- Label repair -------------------------------------------------------

    #[test]
    fn test_roll_end_of_day_advances_date() {
        assert_eq!(roll_end_of_day("01/15/2023 24:00").unwrap(), "01/16/2023 00:00");
    }

    #[test]
    fn test_roll_end_of_day_crosses_month_and_year() {
        assert_eq!(roll_end_of_day("01/31/2023 24:00").unwrap(), "02/01/2023 00:00");
        assert_eq!(roll_end_of_day("12/31/2023 24:00").unwrap(), "01/01/2024 00:00");
        assert_eq!(roll_end_of_day("02/28/2024 24:00").unwrap(), "02/29/2024 00:00");
    }

    #[test]
    fn test_roll_end_of_day_leaves_other_hours_alone() {
        assert_eq!(roll_end_of_day("01/15/2023 13:00").unwrap(), "01/15/2023 13:00");
    }

    #[test]
    fn test_roll_end_of_day_rejects_bad_date_part() {
        let result = roll_end_of_day("13/45/2023 24:00");
        assert!(
            matches!(result, Err(AnalysisError::MalformedTimestamp(_))),
            "invalid date before 24:00 must be malformed, got {:?}",
            result
        );
    }

    #[test]
    fn test_dst_marker_detection() {
        assert!(is_dst_marker("11/05/2023 02:00DST"));
        assert!(!is_dst_marker("11/05/2023 02:00"));
    }

    // --- Batch normalization ------------------------------------------------

    #[test]
    fn test_normalize_parses_labels_in_order() {
        let series = normalize(vec![
            row("01/15/2023 22:00", 1.0),
            row("01/15/2023 23:00", 2.0),
            row("01/15/2023 24:00", 3.0),
            row("01/16/2023 01:00", 4.0),
        ])
        .unwrap();

        let stamps: Vec<_> = series.iter().map(|r| r.timestamp).collect();
        assert_eq!(
            stamps,
            vec![ts(2023, 1, 15, 22), ts(2023, 1, 15, 23), ts(2023, 1, 16, 0), ts(2023, 1, 16, 1)]
        );
    }

    #[test]
    fn test_normalize_drops_only_dst_rows() {
        let series = normalize(vec![
            row("11/05/2023 01:00", 1.0),
            row("11/05/2023 02:00", 2.0),
            row("11/05/2023 02:00DST", 99.0),
            row("11/05/2023 03:00", 3.0),
        ])
        .unwrap();

        let values: Vec<f64> = series.zone_values(ZoneCode::Coast).map(|(_, mw)| mw).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0], "only the DST-flagged row should be removed");
    }

    #[test]
    fn test_normalize_accepts_unpadded_month_and_day() {
        let series = normalize(vec![row("1/5/2023 07:00", 1.0)]).unwrap();
        assert_eq!(series.records()[0].timestamp, ts(2023, 1, 5, 7));
    }

    #[test]
    fn test_malformed_label_aborts_whole_batch() {
        let result = normalize(vec![row("01/15/2023 01:00", 1.0), row("yesterday", 2.0)]);
        assert_eq!(result, Err(AnalysisError::MalformedTimestamp("yesterday".to_string())));
    }

    #[test]
    fn test_rolled_midnight_colliding_with_explicit_midnight_is_duplicate() {
        let result = normalize(vec![row("01/15/2023 24:00", 1.0), row("01/16/2023 00:00", 2.0)]);
        assert!(matches!(result, Err(AnalysisError::DuplicateTimestamp(_))));
    }

    #[test]
    fn test_batches_are_concatenated() {
        let y2023 = vec![row("12/31/2023 23:00", 1.0), row("12/31/2023 24:00", 2.0)];
        let y2024 = vec![row("01/01/2024 01:00", 3.0)];
        let series = normalize_batches(vec![y2023, y2024]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.records()[1].timestamp, ts(2024, 1, 1, 0));
    }

    #[test]
    fn test_empty_input_gives_empty_series() {
        assert!(normalize(Vec::new()).unwrap().is_empty());
    }
}
