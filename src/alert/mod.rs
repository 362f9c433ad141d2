//! Alerting on top of the excess-capacity bands.
//!
//! Submodules:
//! - `thresholds`: compares EV demand curves against the bands hour by hour.

pub mod thresholds;
