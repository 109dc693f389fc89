//! Project configuration supplied by external collaborators
//!
//! The engine never owns project records; reporting period, declarant and
//! emission-factor settings arrive through the [`ProjectConfigProvider`]
//! port and feed aggregation and validation.
//!
//! [`ProjectConfigProvider`]: crate::adapters::store::ProjectConfigProvider

use serde::{Deserialize, Serialize};

/// Default emission factor in tCO2 per MWh, applied when the project uses
/// the commission default or supplies no value
pub const DEFAULT_EMISSION_FACTOR: f64 = 0.4;

/// Quarterly reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportingPeriod {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl ReportingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportingPeriod::Q1 => "Q1",
            ReportingPeriod::Q2 => "Q2",
            ReportingPeriod::Q3 => "Q3",
            ReportingPeriod::Q4 => "Q4",
        }
    }
}

/// Declarant identity, entered manually in project settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarantInfo {
    pub name: Option<String>,
    /// Official identification number (EORI); required for export
    pub identification_number: Option<String>,
    pub address: Option<String>,
}

/// Where the emission factor comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionFactorSource {
    #[default]
    CommissionDefault,
    Provided,
}

/// Emission factor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    pub source: EmissionFactorSource,
    /// Numeric value in tCO2/MWh; meaningful when `source` is `Provided`
    pub value: Option<f64>,
}

impl EmissionFactor {
    /// Resolves the factor to apply: the provided value when present,
    /// otherwise the commission default
    pub fn effective_value(&self) -> f64 {
        match self.source {
            EmissionFactorSource::Provided => self.value.unwrap_or(DEFAULT_EMISSION_FACTOR),
            EmissionFactorSource::CommissionDefault => DEFAULT_EMISSION_FACTOR,
        }
    }
}

/// Project-level settings consumed by aggregation and validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub reporting_period: Option<ReportingPeriod>,
    pub reporting_year: Option<String>,
    pub declarant: Option<DeclarantInfo>,
    /// Installation details, passed through verbatim into the aggregate
    pub installation: Option<serde_json::Value>,
    pub emission_factor: EmissionFactor,
}
