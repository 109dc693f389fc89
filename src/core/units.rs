//! Energy unit normalization
//!
//! MWh is the canonical unit for everything the aggregator and validation
//! engine compute. Conversion factors: kWh → MWh divides by 1000, TJ → MWh
//! multiplies by 277.778.
//!
//! Unrecognized unit strings are treated as kWh. This is a lossy default
//! carried over deliberately: the unit-consistency validation rule flags
//! every unit outside the recognized set, so an unknown unit is surfaced to
//! the reviewer rather than silently trusted. Do not change the default
//! without product sign-off.

use serde::{Deserialize, Serialize};

/// MWh per TJ
pub const MWH_PER_TJ: f64 = 277.778;

/// Supported energy units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "kWh")]
    KilowattHour,
    #[serde(rename = "MWh")]
    MegawattHour,
    #[serde(rename = "TJ")]
    Terajoule,
}

impl EnergyUnit {
    /// Parse a unit string case-insensitively
    ///
    /// Returns `None` for strings outside the recognized set.
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.trim().to_ascii_lowercase().as_str() {
            "kwh" => Some(EnergyUnit::KilowattHour),
            "mwh" => Some(EnergyUnit::MegawattHour),
            "tj" => Some(EnergyUnit::Terajoule),
            _ => None,
        }
    }

    /// Canonical spelling of the unit
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyUnit::KilowattHour => "kWh",
            EnergyUnit::MegawattHour => "MWh",
            EnergyUnit::Terajoule => "TJ",
        }
    }
}

/// Whether a unit string belongs to the recognized set (any casing)
pub fn is_recognized_unit(unit: &str) -> bool {
    EnergyUnit::parse(unit).is_some()
}

/// Convert a quantity in the given unit to MWh
pub fn to_mwh(value: f64, unit: EnergyUnit) -> f64 {
    match unit {
        EnergyUnit::KilowattHour => value / 1000.0,
        EnergyUnit::MegawattHour => value,
        EnergyUnit::Terajoule => value * MWH_PER_TJ,
    }
}

/// Convert a quantity in MWh back to the given unit
///
/// Inverse of [`to_mwh`]; used when presenting canonical figures in a
/// bill's original unit.
pub fn from_mwh(value_mwh: f64, unit: EnergyUnit) -> f64 {
    match unit {
        EnergyUnit::KilowattHour => value_mwh * 1000.0,
        EnergyUnit::MegawattHour => value_mwh,
        EnergyUnit::Terajoule => value_mwh / MWH_PER_TJ,
    }
}

/// Normalize a quantity with a free-form unit string to MWh
///
/// Unrecognized units fall back to kWh (see module docs).
pub fn normalize_to_mwh(value: f64, unit: &str) -> f64 {
    let unit = EnergyUnit::parse(unit).unwrap_or(EnergyUnit::KilowattHour);
    to_mwh(value, unit)
}

/// Parse a numeric field value, tolerating thousands separators ("1,250")
pub fn parse_numeric(value: &str) -> Option<f64> {
    value.trim().replace(',', "").parse::<f64>().ok()
}
