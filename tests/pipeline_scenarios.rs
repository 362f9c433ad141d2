//! End-to-end scenarios for the normalization and excess-capacity pipeline.
//!
//! Tests verify:
//! 1. Hour-label repair (24:00 rollover, DST rows) on realistic batches
//! 2. Ordering invariants of the normalized series, including multi-year input
//! 3. Hourly statistics and excess bands for known inputs
//! 4. Band identities that must hold for any input
//!
//! All inputs are built in memory; no files are read.

use ev_headroom::analysis::excess::compute_excess;
use ev_headroom::analysis::groupings::{aggregate, monthly_peaks};
use ev_headroom::analysis::normalize::{normalize, normalize_batches};
use ev_headroom::analysis::analyze_zone;
use ev_headroom::{AnalysisError, NormalizedSeries, RawObservation, ZoneCode};

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{}: expected {}, got {}",
        what,
        expected,
        actual
    );
}

fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, 0, 0))
        .unwrap()
}

fn row(label: &str, zone: ZoneCode, mw: f64) -> RawObservation {
    RawObservation::new(label).with_power(zone, mw)
}

/// A full day of hour-ending labels (01:00 .. 24:00) for every zone, with
/// load varying by hour and zone.
fn full_day(month: u32, day: u32, year: i32, base: f64) -> Vec<RawObservation> {
    (1..=24)
        .map(|hour| {
            let label = format!("{:02}/{:02}/{} {:02}:00", month, day, year, hour);
            ZoneCode::ALL
                .iter()
                .enumerate()
                .fold(RawObservation::new(label), |obs, (i, &zone)| {
                    obs.with_power(zone, base + (i as f64) * 100.0 + f64::from(hour))
                })
        })
        .collect()
}

fn year_batch(year: i32) -> Vec<RawObservation> {
    (1..=12)
        .flat_map(|month| full_day(month, 10, year, 1_000.0 + f64::from(month)))
        .collect()
}

fn assert_strictly_increasing(series: &NormalizedSeries) {
    for pair in series.records().windows(2) {
        assert!(
            pair[0].timestamp < pair[1].timestamp,
            "timestamps out of order: {} then {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
}

// ---------------------------------------------------------------------------
// 1. Normalization
// ---------------------------------------------------------------------------

#[test]
fn test_end_of_day_label_rolls_to_next_midnight() {
    let series = normalize(vec![row("01/15/2023 24:00", ZoneCode::West, 100.0)]).unwrap();
    assert_eq!(series.records()[0].timestamp, ts(2023, 1, 16, 0));
}

#[test]
fn test_full_day_normalizes_to_strictly_increasing_hours() {
    let series = normalize(full_day(3, 1, 2023, 500.0)).unwrap();
    assert_eq!(series.len(), 24);
    assert_strictly_increasing(&series);
    assert_eq!(series.records()[0].timestamp, ts(2023, 3, 1, 1));
    assert_eq!(series.records()[23].timestamp, ts(2023, 3, 2, 0));
}

#[test]
fn test_dst_row_is_removed_without_disturbing_neighbours() {
    let mut rows = full_day(11, 5, 2023, 500.0);
    let dst_row = row("11/05/2023 02:00DST", ZoneCode::West, 9_999.0);
    rows.insert(2, dst_row);

    let with_dst = normalize(rows).unwrap();
    let without_dst = normalize(full_day(11, 5, 2023, 500.0)).unwrap();

    assert_eq!(with_dst, without_dst, "only the DST row should differ");
    assert!(with_dst.zone_values(ZoneCode::West).all(|(_, mw)| mw < 9_999.0));
}

#[test]
fn test_one_bad_label_yields_no_series() {
    let mut rows = full_day(1, 1, 2023, 500.0);
    rows.push(row("2023-01-02T01:00", ZoneCode::West, 1.0));
    match normalize(rows) {
        Err(AnalysisError::MalformedTimestamp(label)) => assert_eq!(label, "2023-01-02T01:00"),
        other => panic!("expected MalformedTimestamp, got {:?}", other),
    }
}

#[test]
fn test_concatenated_years_equal_merged_years() {
    let combined = normalize_batches(vec![year_batch(2023), year_batch(2024)]).unwrap();

    let merged = normalize(year_batch(2023))
        .unwrap()
        .merge(normalize(year_batch(2024)).unwrap())
        .unwrap();

    assert_eq!(combined, merged);
    assert_strictly_increasing(&combined);
}

#[test]
fn test_batch_order_does_not_change_result() {
    let forward = normalize_batches(vec![year_batch(2023), year_batch(2024)]).unwrap();
    let reversed = normalize_batches(vec![year_batch(2024), year_batch(2023)]).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn test_overlapping_batches_are_rejected() {
    let result = normalize_batches(vec![year_batch(2023), year_batch(2023)]);
    assert!(matches!(result, Err(AnalysisError::DuplicateTimestamp(_))));
}

// ---------------------------------------------------------------------------
// 2. Statistics and bands
// ---------------------------------------------------------------------------

#[test]
fn test_west_hour_five_january_scenario() {
    let series = normalize(vec![
        row("01/02/2023 05:00", ZoneCode::West, 100.0),
        row("01/03/2023 05:00", ZoneCode::West, 120.0),
        row("01/04/2023 05:00", ZoneCode::West, 110.0),
        // January peak comes from another hour
        row("01/04/2023 18:00", ZoneCode::West, 130.0),
    ])
    .unwrap();

    let stats = aggregate(&series, ZoneCode::West);
    let stat = stats
        .iter()
        .find(|s| s.month == 1 && s.hour == 5)
        .expect("January 05:00 group should exist");
    assert_close(stat.mean, 110.0, "mean");
    assert_close(stat.min, 100.0, "min");
    assert_close(stat.max, 120.0, "max");
    assert_close(stat.stddev, 10.0, "stddev");

    let peaks = monthly_peaks(&series, ZoneCode::West);
    assert_eq!(peaks.len(), 1);
    assert_close(peaks[0].peak_mw, 130.0, "January peak");

    let bands = compute_excess(&stats, &peaks).unwrap();
    let band = bands.iter().find(|b| b.hour == 5).unwrap();
    assert_close(band.mean_excess, 20.0, "mean excess");
    assert_close(band.max_excess, 30.0, "max excess");
    assert_close(band.min_excess, 10.0, "min excess");
    assert_close(band.mean_excess_plus_std, 30.0, "mean excess + std");
    assert_close(band.mean_excess_minus_std, 10.0, "mean excess - std");
}

#[test]
fn test_singleton_group_has_nan_stddev_all_the_way_through() {
    let series = normalize(vec![row("06/01/2023 12:00", ZoneCode::South, 5_000.0)]).unwrap();
    let analysis = analyze_zone(&series, ZoneCode::South).unwrap();

    assert!(analysis.hourly_stats[0].stddev.is_nan(), "stddev must be NaN, not zero");
    assert!(analysis.excess_bands[0].mean_excess_plus_std.is_nan());
    assert!(analysis.excess_bands[0].mean_excess_minus_std.is_nan());
    assert_close(analysis.excess_bands[0].mean_excess, 0.0, "mean excess");
}

#[test]
fn test_month_without_data_produces_no_entries() {
    let rows: Vec<_> = year_batch(2023)
        .into_iter()
        .filter(|r| !r.hour_label.starts_with("04/"))
        .collect();
    let series = normalize(rows).unwrap();
    let analysis = analyze_zone(&series, ZoneCode::Coast).unwrap();

    assert!(analysis.hourly_stats.iter().all(|s| s.month != 4));
    assert!(analysis.excess_bands.iter().all(|b| b.month != 4));
    assert!(analysis.monthly_peaks.iter().all(|p| p.month != 4));
    // April 10th 24:00 rolled into April 11th, so April is fully absent.
    assert_eq!(analysis.monthly_peaks.len(), 11);
}

#[test]
fn test_stats_cover_every_observed_group_once() {
    let series = normalize_batches(vec![year_batch(2023), year_batch(2024)]).unwrap();
    let stats = aggregate(&series, ZoneCode::NorthCentral);

    // One sampled day per month, 24 hours each.
    assert_eq!(stats.len(), 12 * 24);
    let mut keys: Vec<_> = stats.iter().map(|s| (s.month, s.hour)).collect();
    let sorted = {
        let mut k = keys.clone();
        k.sort();
        k
    };
    assert_eq!(keys, sorted, "stats should come out month then hour ascending");
    keys.dedup();
    assert_eq!(keys.len(), stats.len(), "no (month, hour) group may repeat");
}

#[test]
fn test_capacity_is_global_and_separate_from_monthly_peak() {
    let series = normalize_batches(vec![year_batch(2023)]).unwrap();
    let analysis = analyze_zone(&series, ZoneCode::Coast).unwrap();

    let highest_monthly = analysis
        .monthly_peaks
        .iter()
        .map(|p| p.peak_mw)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_close(analysis.capacity.capacity_mw, highest_monthly, "capacity");
    assert!(
        analysis.monthly_peaks.iter().any(|p| p.peak_mw < analysis.capacity.capacity_mw),
        "some months should peak below the global capacity"
    );
}

#[test]
fn test_zone_missing_from_input_fails_analysis() {
    let series = normalize(vec![row("01/01/2023 01:00", ZoneCode::Coast, 1.0)]).unwrap();
    assert_eq!(
        analyze_zone(&series, ZoneCode::FarWest),
        Err(AnalysisError::MissingZone(ZoneCode::FarWest))
    );
}

// ---------------------------------------------------------------------------
// 3. Band identities
// ---------------------------------------------------------------------------

#[test]
fn test_band_identities_hold_for_every_group() {
    let mut rows = normalize_batches(vec![year_batch(2023), year_batch(2024)]).unwrap();
    // Add a second sampled day per month so groups have more spread.
    let extra: Vec<_> = (1..=12)
        .flat_map(|m| full_day(m, 20, 2023, 700.0 + f64::from(m) * 7.0))
        .collect();
    rows = rows.merge(normalize(extra).unwrap()).unwrap();

    for zone in ZoneCode::ALL {
        let stats = aggregate(&rows, zone);
        let bands = compute_excess(&stats, &monthly_peaks(&rows, zone)).unwrap();
        assert_eq!(stats.len(), bands.len());

        for (stat, band) in stats.iter().zip(&bands) {
            assert_eq!((stat.month, stat.hour), (band.month, band.hour));
            if !stat.stddev.is_nan() {
                assert_close(
                    band.mean_excess_plus_std - band.mean_excess_minus_std,
                    2.0 * stat.stddev,
                    "std band width",
                );
            }
            assert_close(
                band.max_excess - band.min_excess,
                stat.max - stat.min,
                "extreme band width",
            );
            assert!(band.min_excess >= -EPS, "peak can never be below a group max");
        }
    }
}
