//! Run report
//!
//! Collects the per-zone analysis results into a serializable report and
//! hands it to a `ReportSink`. The JSON sink is what the chart renderer
//! reads; bands and stats are grouped per month, one chart per
//! (zone, month).
//!
//! Undefined values (the std band of single-observation groups) are NaN in
//! memory and serialize as JSON `null`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::alert::thresholds::{HeadroomAlert, HeadroomSeverity};
use crate::analysis::ZoneAnalysis;
use crate::analysis::profiles::DailyProfile;
use crate::calendar::month_name;
use crate::model::{ExcessBand, HourlyStat, NormalizedSeries};
use crate::zones::ZoneCode;

// ============================================================================
// Report Structures
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    pub record_count: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub zones: Vec<ZoneReport>,
    pub failures: Vec<ZoneFailure>,
    pub summary: ReportSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub zones_total: usize,
    pub zones_analyzed: usize,
    pub zones_failed: usize,
    pub excess_bands: usize,
    pub ev_alerts: usize,
    pub worst_severity: Option<HeadroomSeverity>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneReport {
    pub zone: ZoneCode,
    pub alias: &'static str,
    pub name: &'static str,
    pub capacity_mw: f64,
    pub months: Vec<MonthReport>,
    pub daily_profiles: Vec<DailyProfile>,
    pub ev_alerts: Vec<HeadroomAlert>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month: u32,
    pub month_name: &'static str,
    pub peak_mw: f64,
    pub hourly_stats: Vec<HourlyStat>,
    pub excess_bands: Vec<ExcessBand>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneFailure {
    pub zone: ZoneCode,
    pub error: String,
}

// ============================================================================
// Construction
// ============================================================================

impl ZoneReport {
    /// Regroups a zone's flat results per month. Months without stats do not
    /// appear.
    pub fn from_analysis(
        analysis: ZoneAnalysis,
        daily_profiles: Vec<DailyProfile>,
        ev_alerts: Vec<HeadroomAlert>,
    ) -> Self {
        let mut months: BTreeMap<u32, MonthReport> = analysis
            .monthly_peaks
            .iter()
            .map(|peak| {
                (
                    peak.month,
                    MonthReport {
                        month: peak.month,
                        month_name: month_name(peak.month).unwrap_or("Unknown"),
                        peak_mw: peak.peak_mw,
                        hourly_stats: Vec::new(),
                        excess_bands: Vec::new(),
                    },
                )
            })
            .collect();

        for stat in analysis.hourly_stats {
            if let Some(month) = months.get_mut(&stat.month) {
                month.hourly_stats.push(stat);
            }
        }
        for band in analysis.excess_bands {
            if let Some(month) = months.get_mut(&band.month) {
                month.excess_bands.push(band);
            }
        }

        let zone = analysis.zone;
        Self {
            zone,
            alias: zone.alias(),
            name: zone.display_name(),
            capacity_mw: analysis.capacity.capacity_mw,
            months: months.into_values().collect(),
            daily_profiles,
            ev_alerts,
        }
    }
}

impl AnalysisReport {
    pub fn new(
        generated_at: DateTime<Utc>,
        series: &NormalizedSeries,
        zones: Vec<ZoneReport>,
        failures: Vec<ZoneFailure>,
    ) -> Self {
        let summary = ReportSummary {
            zones_total: zones.len() + failures.len(),
            zones_analyzed: zones.len(),
            zones_failed: failures.len(),
            excess_bands: zones
                .iter()
                .flat_map(|z| &z.months)
                .map(|m| m.excess_bands.len())
                .sum(),
            ev_alerts: zones.iter().map(|z| z.ev_alerts.len()).sum(),
            worst_severity: zones
                .iter()
                .flat_map(|z| &z.ev_alerts)
                .map(|a| a.severity)
                .max(),
        };

        Self {
            generated_at: generated_at.to_rfc3339(),
            record_count: series.len(),
            first_timestamp: series.records().first().map(|r| r.timestamp),
            last_timestamp: series.records().last().map(|r| r.timestamp),
            zones,
            failures,
            summary,
        }
    }

    pub fn to_json_string(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ============================================================================
// Sinks
// ============================================================================

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for a finished report (file, renderer, test capture).
pub trait ReportSink {
    fn publish(&mut self, report: &AnalysisReport) -> Result<(), ReportError>;
}

/// Writes the report as pretty-printed JSON, creating parent directories.
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonReportSink {
    fn publish(&mut self, report: &AnalysisReport) -> Result<(), ReportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, report.to_json_string()?)?;
        Ok(())
    }
}
