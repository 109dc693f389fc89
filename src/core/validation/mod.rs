//! Validation engine
//!
//! Runs the ordered rule set over project state, persists the resulting
//! flags (superseding the prior run's flags of the same scope) and reports
//! whether export is gated. Rule order is fixed, so flag output order is
//! stable across runs with unchanged inputs.

pub mod rules;

use crate::adapters::store::{DocumentStore, ProjectConfigProvider};
use crate::config::ValidationConfig;
use crate::domain::{DocumentId, FlagOrigin, ProjectId, Result, ValidationFlag};
use rules::ProjectView;
use std::sync::Arc;

/// Whether export is allowed given the current flag set: no blocking flag
/// that is both unresolved and unacknowledged
pub fn can_export(flags: &[ValidationFlag]) -> bool {
    !flags.iter().any(ValidationFlag::blocks_export)
}

/// Ordered rule runner over store state
pub struct ValidationEngine {
    store: Arc<dyn DocumentStore>,
    projects: Arc<dyn ProjectConfigProvider>,
    config: ValidationConfig,
}

impl ValidationEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        projects: Arc<dyn ProjectConfigProvider>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            store,
            projects,
            config,
        }
    }

    /// Runs the project-level rules, persists the flags and returns them
    /// together with the export verdict
    ///
    /// The verdict considers ALL live project flags, including
    /// document-level ones from pipeline runs.
    pub async fn validate_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<(Vec<ValidationFlag>, bool)> {
        let view = self.gather(project_id).await?;

        let mut flags = Vec::new();
        rules::check_completeness(&view, &mut flags);
        rules::check_unit_consistency(&view, &mut flags);
        rules::check_totals_reconciliation(&view, &self.config, &mut flags);
        rules::check_period_overlap(&view, &mut flags);
        rules::check_confidence(&view, &self.config, &mut flags);
        rules::check_emission_factor(&view, &mut flags);

        tracing::info!(
            project_id = %project_id,
            flags = flags.len(),
            blocking = flags.iter().filter(|f| f.blocks_export()).count(),
            "Project validation complete"
        );

        self.store
            .replace_flags(project_id, FlagOrigin::ProjectValidation, None, flags)
            .await?;

        let all_flags = self.store.project_flags(project_id).await?;
        let verdict = can_export(&all_flags);
        Ok((all_flags, verdict))
    }

    /// Runs the document-level rules against the document's current
    /// extraction and persists the flags, superseding prior ones for the
    /// same document
    pub async fn validate_document(&self, document_id: &DocumentId) -> Result<Vec<ValidationFlag>> {
        let document = self.store.document(document_id).await?;
        let flags = match self.store.current_extraction(document_id).await? {
            Some(extraction) => rules::check_document(&document, &extraction.record),
            None => Vec::new(),
        };

        tracing::debug!(
            document_id = %document_id,
            flags = flags.len(),
            "Document validation complete"
        );

        self.store
            .replace_flags(
                &document.project_id,
                FlagOrigin::DocumentValidation,
                Some(document_id),
                flags,
            )
            .await
    }

    async fn gather(&self, project_id: &ProjectId) -> Result<ProjectView> {
        let settings = self.projects.project_settings(project_id).await?;
        let documents = self.store.project_documents(project_id).await?;

        let mut bills = Vec::new();
        let mut total_mwh = 0.0;
        for document in &documents {
            if !document.status.has_extraction() {
                continue;
            }
            if let Some(extraction) = self.store.current_extraction(&document.id).await? {
                total_mwh += extraction.record.total_mwh;
                bills.extend(extraction.record.bills);
            }
        }

        Ok(ProjectView {
            project_id: project_id.clone(),
            settings,
            documents,
            bills,
            total_mwh,
        })
    }
}
