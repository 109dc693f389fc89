//! Canonical aggregator
//!
//! Rebuilds the project-wide aggregate from scratch: current extraction
//! records of every document with a usable extraction, concatenated in
//! document order, with normalized totals and derived emissions. Pure over
//! store state; the persisted aggregate is only a cache of this function's
//! output.

use crate::adapters::store::{DocumentStore, ProjectConfigProvider};
use crate::domain::{IndirectEmissions, ProjectAggregate, ProjectId, ProjectSettings, Result};
use std::sync::Arc;

/// Rebuilds and persists project aggregates
pub struct Aggregator {
    store: Arc<dyn DocumentStore>,
    projects: Arc<dyn ProjectConfigProvider>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn DocumentStore>, projects: Arc<dyn ProjectConfigProvider>) -> Self {
        Self { store, projects }
    }

    /// Recomputes the aggregate from current store state and persists it
    ///
    /// Total over its input: a project with zero eligible documents yields
    /// a valid empty aggregate, not an error.
    pub async fn recompute(&self, project_id: &ProjectId) -> Result<ProjectAggregate> {
        let settings = self.projects.project_settings(project_id).await?;
        let documents = self.store.project_documents(project_id).await?;

        let mut aggregate = ProjectAggregate::empty();
        aggregate.reporting_period = settings.reporting_period;
        aggregate.reporting_year = settings.reporting_year.clone();
        aggregate.declarant = settings
            .declarant
            .as_ref()
            .map(|d| serde_json::to_value(d))
            .transpose()?;
        aggregate.installation = settings.installation.clone();

        for document in &documents {
            if !document.status.has_extraction() {
                continue;
            }
            let Some(extraction) = self.store.current_extraction(&document.id).await? else {
                continue;
            };
            aggregate.total_mwh += extraction.record.total_mwh;
            aggregate.bills.extend(extraction.record.bills);
        }

        if aggregate.total_mwh > 0.0 {
            aggregate.indirect_emissions = Some(derive_emissions(aggregate.total_mwh, &settings));
        }

        tracing::debug!(
            project_id = %project_id,
            bills = aggregate.bills.len(),
            total_mwh = aggregate.total_mwh,
            "Recomputed project aggregate"
        );
        self.store
            .store_aggregate(project_id, aggregate.clone())
            .await?;
        Ok(aggregate)
    }
}

fn derive_emissions(total_mwh: f64, settings: &ProjectSettings) -> IndirectEmissions {
    let factor = settings.emission_factor.effective_value();
    IndirectEmissions {
        consumed_mwh: total_mwh,
        emission_factor: factor,
        emission_factor_source: settings.emission_factor.source,
        emissions_tco2: total_mwh * factor,
    }
}
