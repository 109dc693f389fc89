//! Recognition provider trait definition
//!
//! The recognition stage turns a document's raw bytes into per-page text
//! plus language/confidence metadata. Providers are opaque: layout
//! analysis and model details live behind this trait.

use crate::domain::{DocumentLanguage, RecognitionError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single page of recognized text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedPage {
    /// 1-based page number
    pub number: u32,

    /// Recognized page text (markdown)
    pub text: String,
}

/// Result of the recognition stage for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionOutcome {
    pub pages: Vec<RecognizedPage>,
    pub page_count: u32,
    pub detected_language: DocumentLanguage,

    /// Overall confidence in 0..=1
    pub confidence: f64,

    /// Wall-clock time of the successful call, in seconds
    pub processing_time_seconds: f64,

    /// Raw provider response, stored whole on the document
    pub raw_response: serde_json::Value,
}

impl RecognitionOutcome {
    /// All pages concatenated with page headings, the form the extraction
    /// stage consumes
    pub fn full_text(&self) -> String {
        self.pages
            .iter()
            .map(|p| format!("## Page {}\n\n{}", p.number, p.text))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }
}

/// Trait for recognition provider implementations
///
/// Implementations must bound their own network time: transient transport
/// failures are retried internally with backoff, everything else propagates
/// immediately as a [`RecognitionError`].
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Recognize the text of a document from its raw bytes
    async fn recognize(
        &self,
        content: &[u8],
    ) -> std::result::Result<RecognitionOutcome, RecognitionError>;

    /// Short provider name for log output
    fn name(&self) -> &'static str;
}
