//! Processing engine facade
//!
//! Wires configuration, providers and the store into one entry point. All
//! operations take `&self`; documents may process concurrently, and the
//! aggregate recomputation is a full rebuild each time, so concurrent
//! writers are last-writer-wins over identical derived state.

use crate::adapters::extraction::ExtractionClient;
use crate::adapters::recognition::RecognitionClient;
use crate::adapters::store::{DocumentStore, ProjectConfigProvider};
use crate::config::MeterboxConfig;
use crate::core::aggregate::Aggregator;
use crate::core::pipeline::DocumentPipeline;
use crate::core::review::{FieldEdit, FieldReviewer};
use crate::core::validation::ValidationEngine;
use crate::domain::{
    Document, DocumentId, DocumentLanguage, ExtractedField, FieldId, FlagId, ProjectAggregate,
    ProjectId, Result, ValidationFlag,
};
use std::sync::Arc;

/// Facade over the pipeline, validation, aggregation and review components
pub struct ProcessingEngine {
    store: Arc<dyn DocumentStore>,
    pipeline: DocumentPipeline,
    validation: Arc<ValidationEngine>,
    aggregator: Arc<Aggregator>,
    reviewer: FieldReviewer,
}

impl ProcessingEngine {
    /// Builds the engine from configuration and ports
    ///
    /// Provider selection (live vs stub) happens here, once, from the
    /// presence of API keys in the configuration.
    pub fn new(
        config: &MeterboxConfig,
        store: Arc<dyn DocumentStore>,
        projects: Arc<dyn ProjectConfigProvider>,
    ) -> Result<Self> {
        let recognition = Arc::new(RecognitionClient::from_config(&config.recognition)?);
        let extraction = Arc::new(ExtractionClient::from_config(&config.extraction)?);
        let validation = Arc::new(ValidationEngine::new(
            store.clone(),
            projects.clone(),
            config.validation.clone(),
        ));
        let aggregator = Arc::new(Aggregator::new(store.clone(), projects));
        let pipeline = DocumentPipeline::new(
            store.clone(),
            recognition,
            extraction,
            validation.clone(),
            aggregator.clone(),
        );
        let reviewer = FieldReviewer::new(store.clone(), aggregator.clone());

        Ok(Self {
            store,
            pipeline,
            validation,
            aggregator,
            reviewer,
        })
    }

    /// Runs the full pipeline for a document
    pub async fn process_document(&self, document_id: &DocumentId) -> Result<Document> {
        self.pipeline.process(document_id).await
    }

    /// Resets a document and runs the pipeline again
    pub async fn reprocess_document(&self, document_id: &DocumentId) -> Result<Document> {
        self.pipeline.reprocess(document_id).await
    }

    /// Processes several documents with bounded concurrency
    ///
    /// Results come back in input order. Stage failures land on the
    /// documents as usual; an `Err` here means an invariant violation for
    /// one of them.
    pub async fn process_documents(
        &self,
        document_ids: &[DocumentId],
        parallelism: usize,
    ) -> Result<Vec<Document>> {
        use futures::stream::{self, StreamExt};

        stream::iter(document_ids)
            .map(|id| self.process_document(id))
            .buffered(parallelism.max(1))
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }

    /// Applies a reviewer edit to a field
    pub async fn recalculate_field(
        &self,
        field_id: &FieldId,
        edit: FieldEdit,
    ) -> Result<ExtractedField> {
        self.reviewer.recalculate_field(field_id, edit).await
    }

    /// Runs project validation; returns all live flags and the export verdict
    pub async fn validate_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<(Vec<ValidationFlag>, bool)> {
        self.validation.validate_project(project_id).await
    }

    /// Recomputes and returns the project aggregate
    pub async fn aggregate(&self, project_id: &ProjectId) -> Result<ProjectAggregate> {
        self.aggregator.recompute(project_id).await
    }

    /// Acknowledges a flag: a reviewer override that unblocks export
    /// without claiming the data was fixed
    pub async fn acknowledge_flag(
        &self,
        flag_id: &FlagId,
        note: Option<String>,
    ) -> Result<ValidationFlag> {
        self.store.acknowledge_flag(flag_id, note).await
    }

    /// Resolves a flag: the underlying data problem was fixed
    pub async fn resolve_flag(
        &self,
        flag_id: &FlagId,
        note: Option<String>,
    ) -> Result<ValidationFlag> {
        self.store.resolve_flag(flag_id, note).await
    }

    /// Marks one field confirmed
    pub async fn confirm_field(&self, field_id: &FieldId) -> Result<ExtractedField> {
        self.reviewer.confirm_field(field_id).await
    }

    /// Confirms all fields of a document's current extraction and marks the
    /// document reviewed; returns the number of fields confirmed
    pub async fn confirm_all_fields(&self, document_id: &DocumentId) -> Result<u32> {
        self.reviewer.confirm_all_fields(document_id).await
    }

    /// Sets or clears a document's language override
    ///
    /// The override wins over the detected language and survives
    /// reprocessing.
    pub async fn set_language_override(
        &self,
        document_id: &DocumentId,
        language: Option<DocumentLanguage>,
    ) -> Result<Document> {
        let mut document = self.store.document(document_id).await?;
        document.language_override = language;
        document.updated_at = chrono::Utc::now();
        self.store.update_document(document.clone()).await?;
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;

    #[tokio::test]
    async fn test_engine_builds_with_stub_providers() {
        let store = Arc::new(MemoryStore::new());
        let config = MeterboxConfig::default();
        assert!(ProcessingEngine::new(&config, store.clone(), store).is_ok());
    }

    #[tokio::test]
    async fn test_language_override_set_and_cleared() {
        let store = Arc::new(MemoryStore::new());
        let document = Document::new(
            DocumentId::new("doc-1").unwrap(),
            ProjectId::new("proj-1").unwrap(),
            "doc-1.pdf",
            "bill.pdf",
            None,
        );
        store
            .insert_document(document.clone(), vec![])
            .await
            .unwrap();

        let engine =
            ProcessingEngine::new(&MeterboxConfig::default(), store.clone(), store).unwrap();

        let updated = engine
            .set_language_override(&document.id, Some(DocumentLanguage::Ar))
            .await
            .unwrap();
        assert_eq!(updated.effective_language(), DocumentLanguage::Ar);

        let cleared = engine
            .set_language_override(&document.id, None)
            .await
            .unwrap();
        assert_eq!(cleared.language_override, None);
    }
}
