//! Structured logging for the excess-capacity pipeline
//!
//! Provides stage- and zone-tagged logging on top of `tracing`. Every event
//! carries the pipeline stage that emitted it and, where relevant, the zone
//! being processed. Supports console output and an append-only log file for
//! batch runs.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt as tracing_fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::model::AnalysisError;
use crate::zones::ZoneCode;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Normalize,
    Capacity,
    Aggregate,
    Excess,
    Report,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => write!(f, "INGEST"),
            Stage::Normalize => write!(f, "NORM"),
            Stage::Capacity => write!(f, "CAP"),
            Stage::Aggregate => write!(f, "AGG"),
            Stage::Excess => write!(f, "EXCESS"),
            Stage::Report => write!(f, "REPORT"),
            Stage::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - the input simply has no data for this zone
    Expected,
    /// Unexpected failure - bad input or an internal invariant violation
    Unexpected,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
        }
    }
}

/// Classify an engine failure for logging severity.
pub fn classify_failure(err: &AnalysisError) -> FailureType {
    match err {
        // A load table without a column for the zone is a data gap, not a bug
        AnalysisError::MissingZone(_) => FailureType::Expected,
        AnalysisError::MalformedTimestamp(_)
        | AnalysisError::DuplicateTimestamp(_)
        | AnalysisError::EmptySeries
        | AnalysisError::MissingPeak { .. } => FailureType::Unexpected,
    }
}

/// Pipeline stage that raises a given engine failure.
pub fn failure_stage(err: &AnalysisError) -> Stage {
    match err {
        AnalysisError::MalformedTimestamp(_) | AnalysisError::DuplicateTimestamp(_) => {
            Stage::Normalize
        }
        AnalysisError::EmptySeries | AnalysisError::MissingZone(_) => Stage::Capacity,
        AnalysisError::MissingPeak { .. } => Stage::Excess,
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides `min_level` when set. When `log_file` is given,
/// every event is also appended to it without ANSI colors. Calling this more
/// than once returns an error from the second call on.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let console: Box<dyn Layer<Registry> + Send + Sync> = if console_timestamps {
        tracing_fmt::layer().with_target(false).boxed()
    } else {
        tracing_fmt::layer().with_target(false).without_time().boxed()
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(min_level).into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(stage: Stage, zone: Option<ZoneCode>, message: &str) {
    tracing::info!(stage = %stage, zone = zone.map(ZoneCode::code), "{}", message);
}

/// Log a warning message
pub fn warn(stage: Stage, zone: Option<ZoneCode>, message: &str) {
    tracing::warn!(stage = %stage, zone = zone.map(ZoneCode::code), "{}", message);
}

/// Log an error message
pub fn error(stage: Stage, zone: Option<ZoneCode>, message: &str) {
    tracing::error!(stage = %stage, zone = zone.map(ZoneCode::code), "{}", message);
}

/// Log a debug message
pub fn debug(stage: Stage, zone: Option<ZoneCode>, message: &str) {
    tracing::debug!(stage = %stage, zone = zone.map(ZoneCode::code), "{}", message);
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a per-zone engine failure with automatic classification
pub fn log_zone_failure(zone: ZoneCode, operation: &str, err: &AnalysisError) {
    let stage = failure_stage(err);
    let failure_type = classify_failure(err);
    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => warn(stage, Some(zone), &message),
        FailureType::Unexpected => error(stage, Some(zone), &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of the per-zone analysis pass
pub fn log_run_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Analysis complete: {}/{} zones successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(Stage::System, None, &message);
    } else if successful == 0 {
        error(Stage::System, None, &message);
    } else {
        warn(Stage::System, None, &message);
    }
}
