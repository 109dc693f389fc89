//! Document pipeline
//!
//! Drives one document through recognition and extraction with failure
//! isolation: each stage failure is terminal for the attempt, recorded on
//! the document verbatim, and never reaches the caller as `Err`. Only
//! invariant violations (missing document, storage failure) propagate.
//!
//! Every run is a full re-run from the start; there is no partial resume.

use crate::adapters::extraction::{ExtractionClient, FieldDraft};
use crate::adapters::recognition::RecognitionClient;
use crate::adapters::store::DocumentStore;
use crate::core::aggregate::Aggregator;
use crate::core::validation::ValidationEngine;
use crate::domain::{
    Document, DocumentId, DocumentStatus, ExtractedField, Extraction, Result,
};
use chrono::Utc;
use std::sync::Arc;

/// Two-stage processing pipeline with failure isolation
pub struct DocumentPipeline {
    store: Arc<dyn DocumentStore>,
    recognition: Arc<RecognitionClient>,
    extraction: Arc<ExtractionClient>,
    validation: Arc<ValidationEngine>,
    aggregator: Arc<Aggregator>,
}

impl DocumentPipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        recognition: Arc<RecognitionClient>,
        extraction: Arc<ExtractionClient>,
        validation: Arc<ValidationEngine>,
        aggregator: Arc<Aggregator>,
    ) -> Self {
        Self {
            store,
            recognition,
            extraction,
            validation,
            aggregator,
        }
    }

    /// Processes a document end to end
    ///
    /// Returns the document in its final state; stage failures are recorded
    /// on it, not returned as `Err`.
    pub async fn process(&self, document_id: &DocumentId) -> Result<Document> {
        let mut document = self.store.document(document_id).await?;
        tracing::info!(
            document_id = %document_id,
            filename = %document.original_filename,
            "Processing document"
        );

        document = self.transition(document, DocumentStatus::Recognizing).await?;

        let content = self.store.document_content(document_id).await?;
        let recognized = match self.recognition.recognize(&content).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(document_id = %document_id, error = %e, "Recognition failed");
                return self
                    .fail(document, DocumentStatus::RecognitionFailed, e.to_string())
                    .await;
            }
        };

        document.page_count = Some(recognized.page_count);
        document.detected_language = recognized.detected_language;
        document.recognition_confidence = Some(recognized.confidence);
        document.recognition_time_seconds = Some(recognized.processing_time_seconds);
        document.recognition_raw_output = Some(recognized.raw_response.clone());
        document = self.transition(document, DocumentStatus::Recognized).await?;

        document = self.transition(document, DocumentStatus::Extracting).await?;

        let outcome = match self
            .extraction
            .extract(&recognized.full_text(), document_id)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(document_id = %document_id, error = %e, "Extraction failed");
                return self
                    .fail(document, DocumentStatus::ExtractionFailed, e.to_string())
                    .await;
            }
        };

        let extraction = Extraction::new(
            document_id.clone(),
            outcome.model.clone(),
            outcome.processing_time_seconds,
            outcome.raw_response.clone(),
            outcome.record.clone(),
        );
        let fields = build_fields(&extraction, outcome.fields);
        let stored = self.store.insert_extraction(extraction, fields).await?;

        // insert_extraction moved the current-version pointer; reload before
        // the final status write so it is not clobbered.
        document = self.store.document(document_id).await?;
        document = self.transition(document, DocumentStatus::Extracted).await?;
        tracing::info!(
            document_id = %document_id,
            version = stored.version,
            total_mwh = stored.record.total_mwh,
            "Document extracted"
        );

        self.validation.validate_document(document_id).await?;
        self.aggregator.recompute(&document.project_id).await?;

        Ok(document)
    }

    /// Resets a document and runs the pipeline again from the start
    ///
    /// The prior extraction versions remain; a successful re-run inserts the
    /// next version and moves the current pointer. A language override set
    /// on the document survives reprocessing.
    pub async fn reprocess(&self, document_id: &DocumentId) -> Result<Document> {
        let mut document = self.store.document(document_id).await?;
        tracing::info!(document_id = %document_id, "Reprocessing document");
        document.status = DocumentStatus::Uploaded;
        document.error_message = None;
        document.updated_at = Utc::now();
        self.store.update_document(document).await?;
        self.process(document_id).await
    }

    async fn transition(
        &self,
        mut document: Document,
        status: DocumentStatus,
    ) -> Result<Document> {
        tracing::debug!(document_id = %document.id, status = ?status, "Status transition");
        document.status = status;
        document.updated_at = Utc::now();
        self.store.update_document(document.clone()).await?;
        Ok(document)
    }

    async fn fail(
        &self,
        mut document: Document,
        status: DocumentStatus,
        error: String,
    ) -> Result<Document> {
        document.status = status;
        document.error_message = Some(error);
        document.updated_at = Utc::now();
        self.store.update_document(document.clone()).await?;
        Ok(document)
    }
}

fn build_fields(extraction: &Extraction, drafts: Vec<FieldDraft>) -> Vec<ExtractedField> {
    drafts
        .into_iter()
        .map(|draft| {
            ExtractedField::new(
                extraction.id.clone(),
                draft.name,
                draft.field_type,
                draft.value,
                draft.unit,
            )
            .with_evidence(draft.confidence, draft.source_page, draft.source_quote)
        })
        .collect()
}
