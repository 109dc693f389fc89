//! Project canonical aggregate
//!
//! The aggregate is a derived structure: merged bill records from every
//! successfully processed document in a project plus normalized totals and
//! derived emissions. It is NEVER the source of truth — the aggregator
//! rebuilds it in full from persisted per-document extractions, so any
//! stored copy is only a cache of a pure function over current state.
//!
//! Determinism matters: the aggregate carries no timestamps, so recomputing
//! with unchanged inputs yields an identical value.

use super::bill::BillRecord;
use super::project::{EmissionFactorSource, ReportingPeriod};
use serde::{Deserialize, Serialize};

/// Schema version tag stamped on every aggregate
pub const AGGREGATE_VERSION: &str = "1.0";

/// Derived indirect emissions for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndirectEmissions {
    /// Electricity consumed in MWh
    pub consumed_mwh: f64,
    /// Factor applied, in tCO2/MWh
    pub emission_factor: f64,
    pub emission_factor_source: EmissionFactorSource,
    /// consumed_mwh × emission_factor
    pub emissions_tco2: f64,
}

/// The merged, normalized, project-wide canonical record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAggregate {
    pub reporting_period: Option<ReportingPeriod>,
    pub reporting_year: Option<String>,

    /// Declarant details passed through from project settings
    pub declarant: Option<serde_json::Value>,
    /// Installation details passed through from project settings
    pub installation: Option<serde_json::Value>,

    /// Bill records from every eligible document, in document order
    pub bills: Vec<BillRecord>,

    /// Total normalized consumption in MWh
    pub total_mwh: f64,

    /// Derived emissions; absent when total consumption is zero
    pub indirect_emissions: Option<IndirectEmissions>,

    /// Schema version tag
    pub version: String,
}

impl ProjectAggregate {
    /// A valid empty aggregate: no bills, zero totals, no emissions entry.
    /// A project with zero eligible documents yields this, not an error.
    pub fn empty() -> Self {
        Self {
            reporting_period: None,
            reporting_year: None,
            declarant: None,
            installation: None,
            bills: Vec::new(),
            total_mwh: 0.0,
            indirect_emissions: None,
            version: AGGREGATE_VERSION.to_string(),
        }
    }

    /// Total derived emissions in tCO2, zero when no emissions entry exists
    pub fn total_emissions_tco2(&self) -> f64 {
        self.indirect_emissions
            .as_ref()
            .map(|e| e.emissions_tco2)
            .unwrap_or(0.0)
    }
}
