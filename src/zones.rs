//! Zone registry for the ERCOT weather zones analyzed by this crate.
//!
//! Defines the canonical list of load zones along with the column code used
//! in ERCOT native-load tables and the lowercase alias used in EV demand
//! file names. This is the single source of truth for zone identifiers; all
//! other modules should go through `ZoneCode` and this registry rather than
//! hardcoding strings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Zone codes
// ---------------------------------------------------------------------------

/// One of the eight ERCOT weather zones.
///
/// Variant order matches the column order of the native-load tables, which is
/// also the order used for sorting and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ZoneCode {
    #[serde(rename = "COAST")]
    Coast,
    #[serde(rename = "EAST")]
    East,
    #[serde(rename = "FWEST")]
    FarWest,
    #[serde(rename = "NORTH")]
    North,
    #[serde(rename = "NCENT")]
    NorthCentral,
    #[serde(rename = "SOUTH")]
    South,
    #[serde(rename = "SCENT")]
    SouthCentral,
    #[serde(rename = "WEST")]
    West,
}

impl ZoneCode {
    /// All zones in registry order.
    pub const ALL: [ZoneCode; 8] = [
        ZoneCode::Coast,
        ZoneCode::East,
        ZoneCode::FarWest,
        ZoneCode::North,
        ZoneCode::NorthCentral,
        ZoneCode::South,
        ZoneCode::SouthCentral,
        ZoneCode::West,
    ];

    /// Column header used in native-load tables, e.g. `"FWEST"`.
    pub fn code(self) -> &'static str {
        self.zone().code
    }

    /// Lowercase alias used in EV demand file names, e.g. `"far_west"`.
    pub fn alias(self) -> &'static str {
        self.zone().alias
    }

    /// Title-cased name for report headings, e.g. `"Far West"`.
    pub fn display_name(self) -> &'static str {
        self.zone().name
    }

    /// Looks up a zone by its table column code. Case-sensitive, surrounding
    /// whitespace ignored.
    pub fn from_code(code: &str) -> Option<ZoneCode> {
        let code = code.trim();
        ZONE_REGISTRY.iter().find(|z| z.code == code).map(|z| z.zone)
    }

    /// Looks up a zone by its file-name alias.
    pub fn from_alias(alias: &str) -> Option<ZoneCode> {
        let alias = alias.trim();
        ZONE_REGISTRY.iter().find(|z| z.alias == alias).map(|z| z.zone)
    }

    fn zone(self) -> &'static Zone {
        // Registry is indexed by declaration order; see test below.
        &ZONE_REGISTRY[self as usize]
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Accepts either the table code (`"NCENT"`) or the alias (`"north_central"`).
impl FromStr for ZoneCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneCode::from_code(s)
            .or_else(|| ZoneCode::from_alias(s))
            .ok_or_else(|| format!("unknown zone: {:?}", s))
    }
}

// ---------------------------------------------------------------------------
// Zone metadata
// ---------------------------------------------------------------------------

/// Metadata for a single weather zone.
#[derive(Debug)]
pub struct Zone {
    pub zone: ZoneCode,
    /// Column header in ERCOT native-load tables.
    pub code: &'static str,
    /// Alias appearing in `daily_ev_load_<alias>.csv`.
    pub alias: &'static str,
    /// Human-readable name.
    pub name: &'static str,
}

/// All ERCOT weather zones, in native-load column order.
pub static ZONE_REGISTRY: &[Zone] = &[
    Zone { zone: ZoneCode::Coast, code: "COAST", alias: "coast", name: "Coast" },
    Zone { zone: ZoneCode::East, code: "EAST", alias: "east", name: "East" },
    Zone { zone: ZoneCode::FarWest, code: "FWEST", alias: "far_west", name: "Far West" },
    Zone { zone: ZoneCode::North, code: "NORTH", alias: "north", name: "North" },
    Zone {
        zone: ZoneCode::NorthCentral,
        code: "NCENT",
        alias: "north_central",
        name: "North Central",
    },
    Zone { zone: ZoneCode::South, code: "SOUTH", alias: "south", name: "South" },
    Zone {
        zone: ZoneCode::SouthCentral,
        code: "SCENT",
        alias: "south_central",
        name: "South Central",
    },
    Zone { zone: ZoneCode::West, code: "WEST", alias: "west", name: "West" },
];

/// Resolves a list of configured zone names (codes or aliases). An empty
/// list means every zone.
pub fn resolve_zones(names: &[String]) -> Result<Vec<ZoneCode>, String> {
    if names.is_empty() {
        return Ok(ZoneCode::ALL.to_vec());
    }
    let mut zones = names
        .iter()
        .map(|n| n.parse::<ZoneCode>())
        .collect::<Result<Vec<_>, _>>()?;
    zones.sort();
    zones.dedup();
    Ok(zones)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
