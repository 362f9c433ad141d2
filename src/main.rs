//! Batch driver: load native-load tables and EV demand curves, analyze each
//! configured zone, and write the JSON report.
//!
//! A zone that fails analysis is logged and listed in the report; any
//! ingest or normalization failure aborts the run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use ev_headroom::alert::thresholds::assess_ev_demand;
use ev_headroom::analysis::normalize::normalize_batches;
use ev_headroom::analysis::profiles::first_of_month_profiles;
use ev_headroom::analysis::{analyze_zone, ZoneAnalysis};
use ev_headroom::config::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH, load_config};
use ev_headroom::ingest::{self, ev_demand};
use ev_headroom::logging::{self, Stage};
use ev_headroom::report::{AnalysisReport, JsonReportSink, ReportSink, ZoneFailure, ZoneReport};
use ev_headroom::zones::ZoneCode;

#[derive(Parser)]
#[command(name = "ev-headroom")]
#[command(about = "Excess grid capacity per zone, month and hour for EV charging", long_about = None)]
struct Cli {
    /// Path to the TOML config (defaults to $EV_HEADROOM_CONFIG, then ev_headroom.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the report output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Analyze only these zones (code or alias); repeatable
    #[arg(short, long = "zone")]
    zones: Vec<String>,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = load_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    if !cli.zones.is_empty() {
        config.analysis.zones = cli.zones;
    }

    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let zones = config.zones()?;
    logging::info(
        Stage::System,
        None,
        &format!("Analyzing {} zones from {}", zones.len(), config_path.display()),
    );

    // Load and normalize; failures here abort the run
    let batches = ingest::load_raw_batches(&config.input.load_files)
        .context("Failed to load native-load tables")?;
    let series = normalize_batches(batches).context("Failed to normalize hour labels")?;

    let ev_curves = match &config.input.ev_demand_dir {
        Some(dir) => ev_demand::load_ev_curves(dir)
            .with_context(|| format!("Failed to load EV demand curves from {}", dir.display()))?,
        None => BTreeMap::new(),
    };

    // Per-zone analysis; failures are recorded and the run continues
    let mut zone_reports = Vec::new();
    let mut failures = Vec::new();
    for &zone in &zones {
        match analyze_zone(&series, zone) {
            Ok(analysis) => {
                zone_reports.push(build_zone_report(
                    analysis,
                    &series,
                    &ev_curves,
                    config.analysis.profile_year,
                ));
            }
            Err(err) => {
                logging::log_zone_failure(zone, "analyze_zone", &err);
                failures.push(ZoneFailure { zone, error: err.to_string() });
            }
        }
    }

    logging::log_run_summary(zones.len(), zone_reports.len(), failures.len());

    let report = AnalysisReport::new(Utc::now(), &series, zone_reports, failures);
    let mut sink = JsonReportSink::new(cli.output.unwrap_or(config.output.report_path));
    sink.publish(&report)
        .with_context(|| format!("Failed to write report {}", sink.path().display()))?;

    logging::info(
        Stage::Report,
        None,
        &format!(
            "Report written to {} ({} bands, {} EV alerts)",
            sink.path().display(),
            report.summary.excess_bands,
            report.summary.ev_alerts
        ),
    );

    Ok(())
}

fn build_zone_report(
    analysis: ZoneAnalysis,
    series: &ev_headroom::NormalizedSeries,
    ev_curves: &BTreeMap<ZoneCode, ev_demand::EvDemandCurve>,
    profile_year: Option<i32>,
) -> ZoneReport {
    let zone = analysis.zone;
    let profiles = first_of_month_profiles(series, zone, profile_year);

    let alerts = match ev_curves.get(&zone) {
        Some(curve) => {
            let alerts = assess_ev_demand(&analysis.excess_bands, curve);
            if !alerts.is_empty() {
                logging::warn(
                    Stage::Excess,
                    Some(zone),
                    &format!("EV demand exceeds headroom in {} (month, hour) slots", alerts.len()),
                );
            }
            alerts
        }
        None => {
            logging::debug(Stage::Excess, Some(zone), "no EV demand curve for zone");
            Vec::new()
        }
    };

    ZoneReport::from_analysis(analysis, profiles, alerts)
}
