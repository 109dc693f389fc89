//! Storage ports
//!
//! The engine talks to persistence through these traits only. The shipped
//! implementation is the in-memory [`MemoryStore`]; a database-backed store
//! implements the same contract.
//!
//! [`MemoryStore`]: super::MemoryStore

use crate::domain::{
    CanonicalRecord, Document, DocumentId, ExtractedField, Extraction, ExtractionId, FieldId,
    FlagId, FlagOrigin, ProjectAggregate, ProjectId, ProjectSettings, Result, ValidationFlag,
};
use async_trait::async_trait;

/// Persistence contract for documents, extractions, fields, flags and the
/// project aggregate
///
/// Contract notes:
/// - [`insert_extraction`](DocumentStore::insert_extraction) assigns the
///   version number (max existing + 1, starting at 1) and moves the owning
///   document's `current_extraction_version` pointer in one critical
///   section. Prior versions are never deleted.
/// - [`replace_flags`](DocumentStore::replace_flags) supersedes the prior
///   flags of the same origin scope in one critical section, carrying
///   acknowledgement and resolution state onto regenerated flags with the
///   same identity key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document together with its raw content bytes
    async fn insert_document(&self, document: Document, content: Vec<u8>) -> Result<()>;

    /// Fetches a document by id
    async fn document(&self, id: &DocumentId) -> Result<Document>;

    /// Persists the full state of an existing document
    async fn update_document(&self, document: Document) -> Result<()>;

    /// Fetches a document's raw content bytes
    async fn document_content(&self, id: &DocumentId) -> Result<Vec<u8>>;

    /// Lists all documents belonging to a project
    async fn project_documents(&self, project_id: &ProjectId) -> Result<Vec<Document>>;

    /// Deletes a document with its content, extractions, fields and any
    /// validation flags scoped to it
    async fn delete_document(&self, id: &DocumentId) -> Result<()>;

    /// Inserts a new extraction version with its fields
    ///
    /// Assigns `version` and updates the owning document's current-version
    /// pointer atomically. Returns the stored extraction with its version
    /// filled in.
    async fn insert_extraction(
        &self,
        extraction: Extraction,
        fields: Vec<ExtractedField>,
    ) -> Result<Extraction>;

    /// The extraction the document's current-version pointer names, if any
    async fn current_extraction(&self, document_id: &DocumentId) -> Result<Option<Extraction>>;

    /// Fetches an extraction by id
    async fn extraction(&self, id: &ExtractionId) -> Result<Extraction>;

    /// All fields of one extraction
    async fn extraction_fields(&self, extraction_id: &ExtractionId) -> Result<Vec<ExtractedField>>;

    /// Fetches a field by id
    async fn field(&self, id: &FieldId) -> Result<ExtractedField>;

    /// Persists the full state of an existing field
    async fn update_field(&self, field: ExtractedField) -> Result<()>;

    /// Replaces the canonical record of an existing extraction in place
    ///
    /// Used by field-edit recalculation; does not create a new version.
    async fn update_extraction_record(
        &self,
        extraction_id: &ExtractionId,
        record: CanonicalRecord,
    ) -> Result<()>;

    /// Replaces the prior flags of one origin scope with a fresh set
    ///
    /// Scope is `(project, origin)` for project runs and
    /// `(project, origin, document)` for document runs. Flags outside the
    /// scope are untouched. Returns the stored flags.
    async fn replace_flags(
        &self,
        project_id: &ProjectId,
        origin: FlagOrigin,
        document_id: Option<&DocumentId>,
        flags: Vec<ValidationFlag>,
    ) -> Result<Vec<ValidationFlag>>;

    /// All live flags of a project
    async fn project_flags(&self, project_id: &ProjectId) -> Result<Vec<ValidationFlag>>;

    /// Marks a flag acknowledged, recording the reviewer's note
    async fn acknowledge_flag(&self, id: &FlagId, note: Option<String>) -> Result<ValidationFlag>;

    /// Marks a flag resolved, recording the note
    async fn resolve_flag(&self, id: &FlagId, note: Option<String>) -> Result<ValidationFlag>;

    /// Stores the project aggregate, replacing any prior one
    async fn store_aggregate(
        &self,
        project_id: &ProjectId,
        aggregate: ProjectAggregate,
    ) -> Result<()>;

    /// The stored project aggregate, if one has been computed
    async fn aggregate(&self, project_id: &ProjectId) -> Result<Option<ProjectAggregate>>;
}

/// Source of project-level settings
///
/// Project records live outside the engine; this port supplies the
/// reporting-period, declarant and emission-factor settings that
/// aggregation and validation consume.
#[async_trait]
pub trait ProjectConfigProvider: Send + Sync {
    async fn project_settings(&self, project_id: &ProjectId) -> Result<ProjectSettings>;
}
