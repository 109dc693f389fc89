//! Extraction provider trait definition
//!
//! The extraction stage turns recognized text into a structured candidate
//! record plus per-field evidence. Model mechanics are opaque behind this
//! trait.

use crate::domain::{CanonicalRecord, DocumentId, ExtractionError, FieldType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A field candidate produced by extraction, before persistence
///
/// Drafts become [`ExtractedField`](crate::domain::ExtractedField) rows
/// (status `unconfirmed`) when the pipeline stores a new extraction
/// version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDraft {
    pub name: String,
    pub field_type: FieldType,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub confidence: Option<f64>,
    pub source_page: Option<u32>,
    pub source_quote: Option<String>,
}

/// Result of the extraction stage for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub fields: Vec<FieldDraft>,

    /// Document-scoped canonical record
    pub record: CanonicalRecord,

    /// Identity of the model that produced the extraction
    pub model: String,

    /// Wall-clock time in seconds
    pub processing_time_seconds: f64,

    /// Raw provider output, stored whole on the extraction
    pub raw_response: serde_json::Value,
}

/// Trait for extraction provider implementations
#[async_trait]
pub trait ExtractionProvider: Send + Sync {
    /// Extract a structured record from recognized text
    async fn extract(
        &self,
        full_text: &str,
        document_id: &DocumentId,
    ) -> std::result::Result<ExtractionOutcome, ExtractionError>;

    /// Short provider name for log output
    fn name(&self) -> &'static str;
}
