//! Run configuration loaded from TOML.
//!
//! ```toml
//! [input]
//! load_files = ["data/Native_Load_2023.xlsx", "data/Native_Load_2024.xlsx"]
//! ev_demand_dir = "data"
//!
//! [analysis]
//! zones = ["coast", "far_west"]   # codes or aliases; empty = all zones
//! profile_year = 2023             # first-of-month profiles for one year only
//!
//! [output]
//! report_path = "plots/excess_report.json"
//!
//! [logging]
//! level = "info"
//! file = "ev_headroom.log"
//! timestamps = true
//! ```
//!
//! Every section except `[input]` is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogLevel;
use crate::zones::{ZoneCode, resolve_zones};

pub const DEFAULT_CONFIG_PATH: &str = "ev_headroom.toml";
/// Environment variable naming the config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "EV_HEADROOM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Native-load tables, concatenated in the order listed.
    pub load_files: Vec<PathBuf>,
    /// Directory holding `daily_ev_load_<alias>.csv` files.
    #[serde(default)]
    pub ev_demand_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub zones: Vec<String>,
    #[serde(default)]
    pub profile_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { report_path: default_report_path() }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("plots/excess_report.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            timestamps: default_timestamps(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timestamps() -> bool {
    true
}

impl Config {
    /// Parses and validates a config from TOML text.
    pub fn from_toml_str(text: &str, path: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Zones to analyze, in registry order.
    pub fn zones(&self) -> Result<Vec<ZoneCode>, ConfigError> {
        resolve_zones(&self.analysis.zones).map_err(ConfigError::Invalid)
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging.level.parse().map_err(ConfigError::Invalid)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.input.load_files.is_empty() {
            return Err(ConfigError::Invalid(
                "input.load_files must list at least one file".to_string(),
            ));
        }
        self.zones()?;
        self.log_level()?;
        Ok(())
    }
}

/// Reads and validates the config file at `path`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    Config::from_toml_str(&text, &display)
}
