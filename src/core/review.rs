//! Field-edit recalculator
//!
//! Applies reviewer edits to extracted fields and keeps the derived figures
//! consistent without re-invoking any provider and without creating a new
//! extraction version. Evidence (source page, source quote) is immutable;
//! the pre-edit value is recorded exactly once, on the first edit.

use crate::adapters::store::DocumentStore;
use crate::core::aggregate::Aggregator;
use crate::core::units;
use crate::domain::{
    DocumentId, DocumentStatus, EnergyQuantity, ExtractedField, FieldId, FieldStatus,
    MeterboxError, Result,
};
use std::sync::Arc;

/// A reviewer's edit to one field
#[derive(Debug, Clone, Default)]
pub struct FieldEdit {
    /// New value; `None` leaves the value unchanged
    pub value: Option<String>,
    /// New unit; `None` leaves the unit unchanged
    pub unit: Option<String>,
    /// Explicit status; when absent, a value change moves an unconfirmed
    /// field to `Corrected`
    pub status: Option<FieldStatus>,
    pub edit_reason: Option<String>,
}

/// Applies field edits and re-derives dependent figures in place
pub struct FieldReviewer {
    store: Arc<dyn DocumentStore>,
    aggregator: Arc<Aggregator>,
}

impl FieldReviewer {
    pub fn new(store: Arc<dyn DocumentStore>, aggregator: Arc<Aggregator>) -> Self {
        Self { store, aggregator }
    }

    /// Applies an edit to a field and returns the updated field
    ///
    /// When the field feeds the canonical record, the owning extraction's
    /// normalized figures are re-derived in place (same version) and the
    /// project aggregate is recomputed.
    pub async fn recalculate_field(
        &self,
        field_id: &FieldId,
        edit: FieldEdit,
    ) -> Result<ExtractedField> {
        let mut field = self.store.field(field_id).await?;

        let value_changed = match &edit.value {
            Some(new_value) => field.value.as_deref() != Some(new_value.as_str()),
            None => false,
        };
        if value_changed && field.original_value.is_none() {
            field.original_value = field.value.clone();
        }

        if let Some(value) = edit.value {
            field.value = Some(value);
        }
        if let Some(unit) = edit.unit {
            field.unit = Some(unit);
        }
        field.status = match edit.status {
            Some(status) => status,
            None if value_changed && field.status == FieldStatus::Unconfirmed => {
                FieldStatus::Corrected
            }
            None => field.status,
        };
        if edit.edit_reason.is_some() {
            field.edit_reason = edit.edit_reason;
        }

        self.store.update_field(field.clone()).await?;
        tracing::info!(
            field_id = %field_id,
            name = %field.name,
            status = ?field.status,
            "Field updated"
        );

        if field.field_type.feeds_canonical_record() {
            self.rederive(&field).await?;
        }

        Ok(field)
    }

    /// Marks a field confirmed without changing its value
    pub async fn confirm_field(&self, field_id: &FieldId) -> Result<ExtractedField> {
        let mut field = self.store.field(field_id).await?;
        field.status = FieldStatus::Confirmed;
        self.store.update_field(field.clone()).await?;
        Ok(field)
    }

    /// Confirms every field of the document's current extraction and marks
    /// the document reviewed
    pub async fn confirm_all_fields(&self, document_id: &DocumentId) -> Result<u32> {
        let Some(extraction) = self.store.current_extraction(document_id).await? else {
            return Err(MeterboxError::Invariant(format!(
                "document {document_id} has no current extraction to confirm"
            )));
        };

        let mut confirmed = 0;
        for mut field in self.store.extraction_fields(&extraction.id).await? {
            if field.status == FieldStatus::Confirmed {
                continue;
            }
            field.status = FieldStatus::Confirmed;
            self.store.update_field(field).await?;
            confirmed += 1;
        }

        let mut document = self.store.document(document_id).await?;
        document.status = DocumentStatus::Reviewed;
        document.updated_at = chrono::Utc::now();
        self.store.update_document(document).await?;

        tracing::info!(document_id = %document_id, confirmed, "Document reviewed");
        Ok(confirmed)
    }

    /// Re-derives the owning extraction's record from the edited field and
    /// recomputes the project aggregate
    ///
    /// A value that doesn't parse as a number leaves the record and the
    /// aggregate untouched; the edit itself stands.
    async fn rederive(&self, field: &ExtractedField) -> Result<()> {
        let Some(value) = field.value.as_deref().and_then(units::parse_numeric) else {
            tracing::warn!(
                field_id = %field.id,
                name = %field.name,
                value = ?field.value,
                "Field value is not numeric, skipping re-derivation"
            );
            return Ok(());
        };
        let unit = field.unit.clone().unwrap_or_else(|| "kWh".to_string());

        let extraction = self.store.extraction(&field.extraction_id).await?;
        let mut record = extraction.record;
        if record.bills.is_empty() {
            record
                .bills
                .push(crate::domain::BillRecord::empty(extraction.document_id.clone()));
        }
        record.bills[0].total_consumption = Some(EnergyQuantity::new(value, unit));
        record.recompute_total();

        self.store
            .update_extraction_record(&field.extraction_id, record)
            .await?;

        let document = self.store.document(&extraction.document_id).await?;
        self.aggregator.recompute(&document.project_id).await?;
        Ok(())
    }
}
