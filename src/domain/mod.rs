//! Domain models and types for Meterbox.
//!
//! This module contains the core domain models, types, and business rules of
//! the document-processing engine.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`ProjectId`], [`DocumentId`],
//!   [`ExtractionId`], [`FieldId`], [`FlagId`])
//! - **Domain models** ([`Document`], [`Extraction`], [`ExtractedField`],
//!   [`BillRecord`], [`ProjectAggregate`], [`ValidationFlag`])
//! - **Error types** ([`MeterboxError`], [`RecognitionError`], [`ExtractionError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Meterbox uses the newtype pattern for identifiers to prevent mixing
//! different ID types:
//!
//! ```rust
//! use meterbox::domain::{DocumentId, FieldId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document_id = DocumentId::new("doc-123")?;
//! let field_id = FieldId::new("field-456")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: DocumentId = field_id;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, MeterboxError>`](Result).
//! Data-quality problems are never errors: they surface as
//! [`ValidationFlag`]s with a severity, and only blocking flags gate export.

pub mod aggregate;
pub mod bill;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod flags;
pub mod ids;
pub mod project;
pub mod result;

// Re-export commonly used types for convenience
pub use aggregate::{IndirectEmissions, ProjectAggregate, AGGREGATE_VERSION};
pub use bill::{BillRecord, BillingPeriod, CanonicalRecord, EnergyQuantity, LineItem, MeterReading};
pub use document::{Document, DocumentLanguage, DocumentStatus};
pub use errors::{ExtractionError, MeterboxError, RecognitionError};
pub use extraction::{ExtractedField, Extraction, FieldStatus, FieldType};
pub use flags::{FlagCategory, FlagOrigin, FlagSeverity, ValidationFlag};
pub use ids::{DocumentId, ExtractionId, FieldId, FlagId, ProjectId};
pub use project::{
    DeclarantInfo, EmissionFactor, EmissionFactorSource, ProjectSettings, ReportingPeriod,
    DEFAULT_EMISSION_FACTOR,
};
pub use result::Result;
