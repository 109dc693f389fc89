//! Extraction domain models
//!
//! An [`Extraction`] is one versioned attempt at producing a structured
//! record from a document's recognized text. Versions are strictly
//! increasing from 1; prior versions are retained forever as an audit
//! trail, and "current" is the version the owning document's
//! `current_extraction_version` pointer names.

use super::bill::CanonicalRecord;
use super::ids::{DocumentId, ExtractionId, FieldId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review status of an extracted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// As produced by the extraction provider, not yet reviewed
    Unconfirmed,
    /// Reviewed and accepted as-is
    Confirmed,
    /// Value changed by a reviewer
    Corrected,
    /// Entered entirely by hand
    Manual,
}

/// Semantic type of an extracted field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Supplier,
    AccountNumber,
    PeriodStart,
    PeriodEnd,
    SiteAddress,
    MeterId,
    Consumption,
    TotalConsumption,
    TotalAmount,
    Currency,
    LineItem,
    Other,
}

impl FieldType {
    /// Whether edits to a field of this type feed the canonical record and
    /// therefore require re-derivation of the document's normalized figures
    pub fn feeds_canonical_record(&self) -> bool {
        matches!(self, FieldType::TotalConsumption)
    }
}

/// One extracted field with evidence and audit trail
///
/// Belongs to exactly one extraction; never shared across extractions and
/// never deleted individually. Evidence (page + quote) is immutable after
/// extraction — manual edits touch only value, unit, status and edit
/// metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedField {
    pub id: FieldId,
    pub extraction_id: ExtractionId,

    pub name: String,
    pub field_type: FieldType,

    pub value: Option<String>,
    pub unit: Option<String>,

    /// Extraction confidence in 0..=1
    pub confidence: Option<f64>,
    pub status: FieldStatus,

    /// Evidence: page number the value was read from
    pub source_page: Option<u32>,
    /// Evidence: quoted source text
    pub source_quote: Option<String>,

    /// Pre-edit value, recorded once on the first edit only
    pub original_value: Option<String>,
    /// Reviewer-supplied reason for the edit
    pub edit_reason: Option<String>,
}

impl ExtractedField {
    /// Creates an unconfirmed field attached to an extraction
    pub fn new(
        extraction_id: ExtractionId,
        name: impl Into<String>,
        field_type: FieldType,
        value: Option<String>,
        unit: Option<String>,
    ) -> Self {
        Self {
            id: FieldId::generate(),
            extraction_id,
            name: name.into(),
            field_type,
            value,
            unit,
            confidence: None,
            status: FieldStatus::Unconfirmed,
            source_page: None,
            source_quote: None,
            original_value: None,
            edit_reason: None,
        }
    }

    /// Attaches evidence to the field
    pub fn with_evidence(
        mut self,
        confidence: Option<f64>,
        source_page: Option<u32>,
        source_quote: Option<String>,
    ) -> Self {
        self.confidence = confidence;
        self.source_page = source_page;
        self.source_quote = source_quote;
        self
    }
}

/// One versioned extraction attempt for a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub id: ExtractionId,
    pub document_id: DocumentId,

    /// Strictly increasing per document, starting at 1
    pub version: u32,

    /// Identity of the model that produced this extraction
    pub model: String,

    /// Extraction wall-clock time in seconds
    pub processing_time_seconds: f64,

    /// Raw provider output, stored whole
    pub raw_output: serde_json::Value,

    /// Document-scoped canonical record
    pub record: CanonicalRecord,

    pub created_at: DateTime<Utc>,
}

impl Extraction {
    /// Creates an extraction; the version is assigned by the store on insert
    pub fn new(
        document_id: DocumentId,
        model: impl Into<String>,
        processing_time_seconds: f64,
        raw_output: serde_json::Value,
        record: CanonicalRecord,
    ) -> Self {
        Self {
            id: ExtractionId::generate(),
            document_id,
            version: 0,
            model: model.into(),
            processing_time_seconds,
            raw_output,
            record,
            created_at: Utc::now(),
        }
    }
}
