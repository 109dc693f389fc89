//! Document domain model
//!
//! A document is one uploaded source file (energy bill) undergoing
//! processing. Its `status` is mutated only by the document pipeline and by
//! manual overrides (language override, reprocess request).

use super::ids::{DocumentId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a document
///
/// Lifecycle: `Uploaded → Recognizing → Recognized → Extracting → Extracted`,
/// with `RecognitionFailed`/`ExtractionFailed` as per-stage terminal failures.
/// `Reviewed` is set externally once a user has confirmed all fields; the
/// pipeline never writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Recognizing,
    Recognized,
    Extracting,
    Extracted,
    RecognitionFailed,
    ExtractionFailed,
    Reviewed,
}

impl DocumentStatus {
    /// Whether this document has a usable current extraction
    /// (state `extracted` or later)
    pub fn has_extraction(&self) -> bool {
        matches!(self, DocumentStatus::Extracted | DocumentStatus::Reviewed)
    }

    /// Whether this document stopped on a stage failure
    pub fn is_failed(&self) -> bool {
        matches!(
            self,
            DocumentStatus::RecognitionFailed | DocumentStatus::ExtractionFailed
        )
    }
}

/// Detected (or overridden) document language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentLanguage {
    En,
    Fr,
    Ar,
    Unknown,
}

impl DocumentLanguage {
    /// Parse an ISO-639-1 style language code; anything unrecognized maps to
    /// `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code {
            "en" => DocumentLanguage::En,
            "fr" => DocumentLanguage::Fr,
            "ar" => DocumentLanguage::Ar,
            _ => DocumentLanguage::Unknown,
        }
    }

    /// The language code as a string slice
    pub fn as_code(&self) -> &'static str {
        match self {
            DocumentLanguage::En => "en",
            DocumentLanguage::Fr => "fr",
            DocumentLanguage::Ar => "ar",
            DocumentLanguage::Unknown => "unknown",
        }
    }
}

/// An uploaded energy-bill document
///
/// Holds file metadata, lifecycle status and the recognition-stage results.
/// The raw recognition output is stored whole so extraction can be re-run or
/// inspected without calling the provider again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Owning project
    pub project_id: ProjectId,

    /// Stored filename
    pub filename: String,

    /// Filename as uploaded by the user
    pub original_filename: String,

    /// File size in bytes
    pub file_size: Option<u64>,

    /// Processing lifecycle status
    pub status: DocumentStatus,

    /// Number of recognized pages
    pub page_count: Option<u32>,

    /// Language detected by the recognition stage
    pub detected_language: DocumentLanguage,

    /// Manual language override; wins over `detected_language` when set
    pub language_override: Option<DocumentLanguage>,

    /// Recognition confidence in 0..=1
    pub recognition_confidence: Option<f64>,

    /// Recognition wall-clock time in seconds
    pub recognition_time_seconds: Option<f64>,

    /// Raw recognition output, stored whole
    pub recognition_raw_output: Option<serde_json::Value>,

    /// Version number of the current extraction, if any
    ///
    /// This pointer is updated in the same store critical section that
    /// inserts a new extraction version, so there is never a window with
    /// zero or two current versions.
    pub current_extraction_version: Option<u32>,

    /// Error message from the last failed stage, verbatim
    pub error_message: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates a freshly uploaded document with no processing results yet
    pub fn new(
        id: DocumentId,
        project_id: ProjectId,
        filename: impl Into<String>,
        original_filename: impl Into<String>,
        file_size: Option<u64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            project_id,
            filename: filename.into(),
            original_filename: original_filename.into(),
            file_size,
            status: DocumentStatus::Uploaded,
            page_count: None,
            detected_language: DocumentLanguage::Unknown,
            language_override: None,
            recognition_confidence: None,
            recognition_time_seconds: None,
            recognition_raw_output: None,
            current_extraction_version: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The language to use for this document: the override when present,
    /// otherwise the detected language
    pub fn effective_language(&self) -> DocumentLanguage {
        self.language_override.unwrap_or(self.detected_language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        Document::new(
            DocumentId::new("doc-1").unwrap(),
            ProjectId::new("proj-1").unwrap(),
            "doc-1.pdf",
            "january-bill.pdf",
            Some(42_000),
        )
    }

    #[test]
    fn test_new_document_starts_uploaded() {
        let doc = sample_document();
        assert_eq!(doc.status, DocumentStatus::Uploaded);
        assert!(doc.current_extraction_version.is_none());
        assert!(doc.error_message.is_none());
    }

    #[test]
    fn test_status_has_extraction() {
        assert!(DocumentStatus::Extracted.has_extraction());
        assert!(DocumentStatus::Reviewed.has_extraction());
        assert!(!DocumentStatus::Recognized.has_extraction());
        assert!(!DocumentStatus::ExtractionFailed.has_extraction());
    }

    #[test]
    fn test_status_is_failed() {
        assert!(DocumentStatus::RecognitionFailed.is_failed());
        assert!(DocumentStatus::ExtractionFailed.is_failed());
        assert!(!DocumentStatus::Extracted.is_failed());
    }

    #[test]
    fn test_language_override_wins() {
        let mut doc = sample_document();
        doc.detected_language = DocumentLanguage::En;
        assert_eq!(doc.effective_language(), DocumentLanguage::En);

        doc.language_override = Some(DocumentLanguage::Fr);
        assert_eq!(doc.effective_language(), DocumentLanguage::Fr);
    }

    #[test]
    fn test_language_codes_round_trip() {
        for lang in [
            DocumentLanguage::En,
            DocumentLanguage::Fr,
            DocumentLanguage::Ar,
        ] {
            assert_eq!(DocumentLanguage::from_code(lang.as_code()), lang);
        }
        assert_eq!(
            DocumentLanguage::from_code("de"),
            DocumentLanguage::Unknown
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&DocumentStatus::RecognitionFailed).unwrap();
        assert_eq!(json, "\"recognition_failed\"");
    }
}
