//! Canonical bill structures
//!
//! These types form the document-scoped canonical record produced by the
//! extraction stage and the building blocks of the project aggregate. Every
//! energy quantity carries both its original unit (as extracted) and its
//! normalized MWh value, so validation rules can reason about the source
//! unit while totals are always summed in MWh.

use super::ids::DocumentId;
use crate::core::units;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An energy quantity with its original unit and the normalized MWh value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyQuantity {
    /// Value as extracted from the document
    pub value: f64,

    /// Unit string as extracted (free-form; may be outside the recognized set)
    pub unit: String,

    /// Value converted to MWh
    pub normalized_mwh: f64,
}

impl EnergyQuantity {
    /// Creates a quantity, computing the normalized MWh value
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        let normalized_mwh = units::normalize_to_mwh(value, &unit);
        Self {
            value,
            unit,
            normalized_mwh,
        }
    }
}

/// Billing period with optional parsed bounds
///
/// `period_string` keeps the original period text from the document even
/// when the dates could not be parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub period_string: Option<String>,
}

impl BillingPeriod {
    /// Whether both bounds are missing
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }

    /// Inclusive-bounds overlap check: two ranges overlap when
    /// `start1 <= end2 && start2 <= end1`. Returns `false` unless both
    /// periods have both bounds parseable.
    pub fn overlaps(&self, other: &BillingPeriod) -> bool {
        match (
            self.start_date,
            self.end_date,
            other.start_date,
            other.end_date,
        ) {
            (Some(s1), Some(e1), Some(s2), Some(e2)) => s1 <= e2 && s2 <= e1,
            _ => false,
        }
    }
}

/// A single charge line on a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

/// One meter's readings on a bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    pub meter_id: Option<String>,
    pub reading_start: Option<f64>,
    pub reading_end: Option<f64>,
    pub consumption: Option<f64>,
    pub unit: Option<String>,
}

/// The canonical record of one energy bill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    /// Document this bill was extracted from
    pub document_id: DocumentId,

    pub supplier: Option<String>,
    pub account_number: Option<String>,
    pub billing_period: BillingPeriod,
    pub site_address: Option<String>,
    pub meter_readings: Vec<MeterReading>,
    pub line_items: Vec<LineItem>,

    /// Total consumption on the bill, when extracted
    pub total_consumption: Option<EnergyQuantity>,

    pub total_amount: Option<f64>,
    pub currency: Option<String>,
}

impl BillRecord {
    /// Creates an empty bill record for a document
    pub fn empty(document_id: DocumentId) -> Self {
        Self {
            document_id,
            supplier: None,
            account_number: None,
            billing_period: BillingPeriod::default(),
            site_address: None,
            meter_readings: Vec::new(),
            line_items: Vec::new(),
            total_consumption: None,
            total_amount: None,
            currency: None,
        }
    }

    /// Normalized total consumption in MWh, zero when missing
    pub fn normalized_total_mwh(&self) -> f64 {
        self.total_consumption
            .as_ref()
            .map(|q| q.normalized_mwh)
            .unwrap_or(0.0)
    }
}

/// Document-scoped canonical record: the bills extracted from one document
/// plus their normalized total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub bills: Vec<BillRecord>,

    /// Sum of the bills' normalized totals, in MWh
    pub total_mwh: f64,
}

impl CanonicalRecord {
    /// Builds a record from bills, computing the normalized total
    pub fn from_bills(bills: Vec<BillRecord>) -> Self {
        let total_mwh = bills.iter().map(BillRecord::normalized_total_mwh).sum();
        Self { bills, total_mwh }
    }

    /// Recomputes `total_mwh` from the bills in place
    ///
    /// Called after a field edit rewrites a bill's total consumption.
    pub fn recompute_total(&mut self) {
        self.total_mwh = self
            .bills
            .iter()
            .map(BillRecord::normalized_total_mwh)
            .sum();
    }
}
