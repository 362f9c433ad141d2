//! Zone excess-capacity analysis for EV charging.
//!
//! Normalizes multi-year hourly native-load tables for the ERCOT weather
//! zones and derives, per zone, month and hour of day, how much headroom is
//! left below the monthly peak. EV demand curves are then checked against
//! that headroom.
//!
//! Pipeline: `ingest` → `analysis::normalize` → `analysis::{capacity,
//! groupings, excess}` → `alert` → `report`.

pub mod alert;
pub mod analysis;
pub mod calendar;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod report;
pub mod zones;

pub use model::{
    AnalysisError, ExcessBand, HourlyStat, MonthlyPeak, NormalizedRecord, NormalizedSeries,
    RawObservation, ZoneCapacity,
};
pub use zones::ZoneCode;
