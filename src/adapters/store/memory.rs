//! In-memory store
//!
//! Reference implementation of [`DocumentStore`] and
//! [`ProjectConfigProvider`] backed by a single `tokio::sync::RwLock`. The
//! one lock makes the multi-step contract operations (version assignment,
//! flag supersession) trivially atomic.

use super::traits::{DocumentStore, ProjectConfigProvider};
use crate::domain::{
    CanonicalRecord, Document, DocumentId, ExtractedField, Extraction, ExtractionId, FieldId,
    FlagId, FlagOrigin, MeterboxError, ProjectAggregate, ProjectId, ProjectSettings, Result,
    ValidationFlag,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    documents: HashMap<DocumentId, Document>,
    contents: HashMap<DocumentId, Vec<u8>>,
    extractions: HashMap<ExtractionId, Extraction>,
    fields: HashMap<FieldId, ExtractedField>,
    flags: Vec<ValidationFlag>,
    aggregates: HashMap<ProjectId, ProjectAggregate>,
    settings: HashMap<ProjectId, ProjectSettings>,
}

/// In-memory [`DocumentStore`] and [`ProjectConfigProvider`]
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the settings returned for a project
    pub async fn set_project_settings(&self, project_id: ProjectId, settings: ProjectSettings) {
        self.state.write().await.settings.insert(project_id, settings);
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> MeterboxError {
    MeterboxError::NotFound(format!("{what} {id}"))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, document: Document, content: Vec<u8>) -> Result<()> {
        let mut state = self.state.write().await;
        state.contents.insert(document.id.clone(), content);
        state.documents.insert(document.id.clone(), document);
        Ok(())
    }

    async fn document(&self, id: &DocumentId) -> Result<Document> {
        self.state
            .read()
            .await
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("document", id))
    }

    async fn update_document(&self, document: Document) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.documents.contains_key(&document.id) {
            return Err(not_found("document", &document.id));
        }
        state.documents.insert(document.id.clone(), document);
        Ok(())
    }

    async fn document_content(&self, id: &DocumentId) -> Result<Vec<u8>> {
        self.state
            .read()
            .await
            .contents
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("document content", id))
    }

    async fn project_documents(&self, project_id: &ProjectId) -> Result<Vec<Document>> {
        let state = self.state.read().await;
        let mut documents: Vec<Document> = state
            .documents
            .values()
            .filter(|d| &d.project_id == project_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(documents)
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<()> {
        let mut state = self.state.write().await;
        if state.documents.remove(id).is_none() {
            return Err(not_found("document", id));
        }
        state.contents.remove(id);
        let removed: Vec<ExtractionId> = state
            .extractions
            .values()
            .filter(|e| &e.document_id == id)
            .map(|e| e.id.clone())
            .collect();
        for extraction_id in &removed {
            state.extractions.remove(extraction_id);
        }
        state
            .fields
            .retain(|_, f| !removed.contains(&f.extraction_id));
        // Flags scoped to the document go with it; a leftover blocking flag
        // could never be superseded and would gate export forever.
        state.flags.retain(|f| f.document_id.as_ref() != Some(id));
        Ok(())
    }

    async fn insert_extraction(
        &self,
        mut extraction: Extraction,
        mut fields: Vec<ExtractedField>,
    ) -> Result<Extraction> {
        let mut state = self.state.write().await;

        let next_version = state
            .extractions
            .values()
            .filter(|e| e.document_id == extraction.document_id)
            .map(|e| e.version)
            .max()
            .unwrap_or(0)
            + 1;
        extraction.version = next_version;

        let document = state
            .documents
            .get_mut(&extraction.document_id)
            .ok_or_else(|| not_found("document", &extraction.document_id))?;
        document.current_extraction_version = Some(next_version);

        for field in &mut fields {
            field.extraction_id = extraction.id.clone();
        }
        for field in fields {
            state.fields.insert(field.id.clone(), field);
        }
        state
            .extractions
            .insert(extraction.id.clone(), extraction.clone());
        Ok(extraction)
    }

    async fn current_extraction(&self, document_id: &DocumentId) -> Result<Option<Extraction>> {
        let state = self.state.read().await;
        let document = state
            .documents
            .get(document_id)
            .ok_or_else(|| not_found("document", document_id))?;
        let Some(version) = document.current_extraction_version else {
            return Ok(None);
        };
        Ok(state
            .extractions
            .values()
            .find(|e| &e.document_id == document_id && e.version == version)
            .cloned())
    }

    async fn extraction(&self, id: &ExtractionId) -> Result<Extraction> {
        self.state
            .read()
            .await
            .extractions
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("extraction", id))
    }

    async fn extraction_fields(&self, extraction_id: &ExtractionId) -> Result<Vec<ExtractedField>> {
        let state = self.state.read().await;
        let mut fields: Vec<ExtractedField> = state
            .fields
            .values()
            .filter(|f| &f.extraction_id == extraction_id)
            .cloned()
            .collect();
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fields)
    }

    async fn field(&self, id: &FieldId) -> Result<ExtractedField> {
        self.state
            .read()
            .await
            .fields
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("field", id))
    }

    async fn update_field(&self, field: ExtractedField) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.fields.contains_key(&field.id) {
            return Err(not_found("field", &field.id));
        }
        state.fields.insert(field.id.clone(), field);
        Ok(())
    }

    async fn update_extraction_record(
        &self,
        extraction_id: &ExtractionId,
        record: CanonicalRecord,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let extraction = state
            .extractions
            .get_mut(extraction_id)
            .ok_or_else(|| not_found("extraction", extraction_id))?;
        extraction.record = record;
        Ok(())
    }

    async fn replace_flags(
        &self,
        project_id: &ProjectId,
        origin: FlagOrigin,
        document_id: Option<&DocumentId>,
        mut flags: Vec<ValidationFlag>,
    ) -> Result<Vec<ValidationFlag>> {
        let mut state = self.state.write().await;

        let in_scope = |f: &ValidationFlag| {
            &f.project_id == project_id
                && f.origin == origin
                && match document_id {
                    Some(doc) => f.document_id.as_ref() == Some(doc),
                    None => true,
                }
        };

        // Carry reviewer decisions onto regenerated flags with the same
        // identity key, then drop the superseded set.
        for flag in &mut flags {
            let key = flag.supersession_key();
            // supersession_key borrows; compare via owned pieces.
            let (code, doc, field) = (key.0, key.1.cloned(), key.2.map(str::to_string));
            if let Some(prior) = state.flags.iter().find(|f| {
                in_scope(f)
                    && f.code == code
                    && f.document_id == doc
                    && f.field_name.as_deref() == field.as_deref()
            }) {
                flag.is_acknowledged = prior.is_acknowledged;
                flag.is_resolved = prior.is_resolved;
                flag.resolution_note = prior.resolution_note.clone();
            }
        }

        state.flags.retain(|f| !in_scope(f));
        state.flags.extend(flags.iter().cloned());
        Ok(flags)
    }

    async fn project_flags(&self, project_id: &ProjectId) -> Result<Vec<ValidationFlag>> {
        Ok(self
            .state
            .read()
            .await
            .flags
            .iter()
            .filter(|f| &f.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn acknowledge_flag(&self, id: &FlagId, note: Option<String>) -> Result<ValidationFlag> {
        let mut state = self.state.write().await;
        let flag = state
            .flags
            .iter_mut()
            .find(|f| &f.id == id)
            .ok_or_else(|| not_found("flag", id))?;
        flag.is_acknowledged = true;
        if note.is_some() {
            flag.resolution_note = note;
        }
        Ok(flag.clone())
    }

    async fn resolve_flag(&self, id: &FlagId, note: Option<String>) -> Result<ValidationFlag> {
        let mut state = self.state.write().await;
        let flag = state
            .flags
            .iter_mut()
            .find(|f| &f.id == id)
            .ok_or_else(|| not_found("flag", id))?;
        flag.is_resolved = true;
        if note.is_some() {
            flag.resolution_note = note;
        }
        Ok(flag.clone())
    }

    async fn store_aggregate(
        &self,
        project_id: &ProjectId,
        aggregate: ProjectAggregate,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .aggregates
            .insert(project_id.clone(), aggregate);
        Ok(())
    }

    async fn aggregate(&self, project_id: &ProjectId) -> Result<Option<ProjectAggregate>> {
        Ok(self.state.read().await.aggregates.get(project_id).cloned())
    }
}

#[async_trait]
impl ProjectConfigProvider for MemoryStore {
    async fn project_settings(&self, project_id: &ProjectId) -> Result<ProjectSettings> {
        Ok(self
            .state
            .read()
            .await
            .settings
            .get(project_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FlagCategory, FlagSeverity};

    fn sample_document(id: &str, project: &str) -> Document {
        Document::new(
            DocumentId::new(id).unwrap(),
            ProjectId::new(project).unwrap(),
            format!("{id}.pdf"),
            "bill.pdf",
            Some(100),
        )
    }

    fn sample_extraction(doc: &DocumentId) -> Extraction {
        Extraction::new(
            doc.clone(),
            "stub",
            0.1,
            serde_json::json!({}),
            CanonicalRecord::from_bills(vec![]),
        )
    }

    #[tokio::test]
    async fn test_document_round_trip() {
        let store = MemoryStore::new();
        let doc = sample_document("doc-1", "proj-1");
        store
            .insert_document(doc.clone(), b"content".to_vec())
            .await
            .unwrap();

        let fetched = store.document(&doc.id).await.unwrap();
        assert_eq!(fetched.filename, "doc-1.pdf");
        assert_eq!(
            store.document_content(&doc.id).await.unwrap(),
            b"content".to_vec()
        );
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .document(&DocumentId::new("missing").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, MeterboxError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_extraction_assigns_versions_and_pointer() {
        let store = MemoryStore::new();
        let doc = sample_document("doc-1", "proj-1");
        store.insert_document(doc.clone(), vec![]).await.unwrap();

        let first = store
            .insert_extraction(sample_extraction(&doc.id), vec![])
            .await
            .unwrap();
        assert_eq!(first.version, 1);

        let second = store
            .insert_extraction(sample_extraction(&doc.id), vec![])
            .await
            .unwrap();
        assert_eq!(second.version, 2);

        let document = store.document(&doc.id).await.unwrap();
        assert_eq!(document.current_extraction_version, Some(2));

        let current = store.current_extraction(&doc.id).await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
    }

    #[tokio::test]
    async fn test_replace_flags_supersedes_in_scope_only() {
        let store = MemoryStore::new();
        let project = ProjectId::new("proj-1").unwrap();

        let project_flag = ValidationFlag::builder(
            project.clone(),
            FlagOrigin::ProjectValidation,
            "MISSING_CONSUMPTION",
            FlagCategory::MissingRequired,
            FlagSeverity::Blocking,
            "No consumption data",
        )
        .build();
        let doc_flag = ValidationFlag::builder(
            project.clone(),
            FlagOrigin::DocumentValidation,
            "LOW_CONFIDENCE",
            FlagCategory::ExtractionConfidence,
            FlagSeverity::Info,
            "Low confidence",
        )
        .document(DocumentId::new("doc-1").unwrap())
        .build();

        store
            .replace_flags(&project, FlagOrigin::ProjectValidation, None, vec![project_flag])
            .await
            .unwrap();
        store
            .replace_flags(
                &project,
                FlagOrigin::DocumentValidation,
                Some(&DocumentId::new("doc-1").unwrap()),
                vec![doc_flag],
            )
            .await
            .unwrap();
        assert_eq!(store.project_flags(&project).await.unwrap().len(), 2);

        // A fresh project run leaves the document-scoped flag alone.
        store
            .replace_flags(&project, FlagOrigin::ProjectValidation, None, vec![])
            .await
            .unwrap();
        let remaining = store.project_flags(&project).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].origin, FlagOrigin::DocumentValidation);
    }

    #[tokio::test]
    async fn test_replace_flags_carries_acknowledgement() {
        let store = MemoryStore::new();
        let project = ProjectId::new("proj-1").unwrap();

        let make_flag = || {
            ValidationFlag::builder(
                project.clone(),
                FlagOrigin::ProjectValidation,
                "MISSING_DECLARANT",
                FlagCategory::MissingRequired,
                FlagSeverity::Blocking,
                "Declarant missing",
            )
            .build()
        };

        let stored = store
            .replace_flags(&project, FlagOrigin::ProjectValidation, None, vec![make_flag()])
            .await
            .unwrap();
        store
            .acknowledge_flag(&stored[0].id, Some("known, export anyway".to_string()))
            .await
            .unwrap();

        let regenerated = store
            .replace_flags(&project, FlagOrigin::ProjectValidation, None, vec![make_flag()])
            .await
            .unwrap();
        assert!(regenerated[0].is_acknowledged);
        assert_eq!(
            regenerated[0].resolution_note.as_deref(),
            Some("known, export anyway")
        );
        assert!(!regenerated[0].blocks_export());
    }

    #[tokio::test]
    async fn test_delete_document_removes_extractions_and_fields() {
        let store = MemoryStore::new();
        let doc = sample_document("doc-1", "proj-1");
        store.insert_document(doc.clone(), vec![]).await.unwrap();
        let extraction = store
            .insert_extraction(
                sample_extraction(&doc.id),
                vec![ExtractedField::new(
                    ExtractionId::generate(),
                    "supplier",
                    crate::domain::FieldType::Supplier,
                    Some("Energy Corp".to_string()),
                    None,
                )],
            )
            .await
            .unwrap();

        store.delete_document(&doc.id).await.unwrap();
        assert!(store.document(&doc.id).await.is_err());
        assert!(store
            .extraction_fields(&extraction.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_document_removes_its_flags() {
        let store = MemoryStore::new();
        let project = ProjectId::new("proj-1").unwrap();
        let doc = sample_document("doc-1", "proj-1");
        store.insert_document(doc.clone(), vec![]).await.unwrap();

        let blocking = ValidationFlag::builder(
            project.clone(),
            FlagOrigin::DocumentValidation,
            "MISSING_TOTAL_CONSUMPTION",
            FlagCategory::MissingRequired,
            FlagSeverity::Blocking,
            "No total consumption",
        )
        .document(doc.id.clone())
        .build();
        let project_flag = ValidationFlag::builder(
            project.clone(),
            FlagOrigin::ProjectValidation,
            "MISSING_REPORTING_PERIOD",
            FlagCategory::MissingRequired,
            FlagSeverity::Warning,
            "No reporting period",
        )
        .build();
        store
            .replace_flags(
                &project,
                FlagOrigin::DocumentValidation,
                Some(&doc.id),
                vec![blocking],
            )
            .await
            .unwrap();
        store
            .replace_flags(&project, FlagOrigin::ProjectValidation, None, vec![project_flag])
            .await
            .unwrap();

        store.delete_document(&doc.id).await.unwrap();

        // Only the document-scoped flag goes; project-scope flags stay.
        let remaining = store.project_flags(&project).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].code, "MISSING_REPORTING_PERIOD");
    }

    #[tokio::test]
    async fn test_project_settings_default_when_unset() {
        let store = MemoryStore::new();
        let settings = store
            .project_settings(&ProjectId::new("proj-1").unwrap())
            .await
            .unwrap();
        assert_eq!(settings, ProjectSettings::default());
    }
}
