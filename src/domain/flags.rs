//! Validation flag domain model
//!
//! A flag is a structured, severity-graded data-quality issue raised by a
//! validation rule. Data-quality problems are never errors: they always
//! surface as flags, and only blocking flags gate export.

use super::ids::{DocumentId, FlagId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity level of validation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Info,
    Warning,
    Blocking,
}

/// Category of validation flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    UnitConsistency,
    TotalsMismatch,
    MissingRequired,
    DataQuality,
    PeriodOverlap,
    ExtractionConfidence,
}

/// Which validation run produced a flag
///
/// Supersession is scoped by origin: a project-level run replaces prior
/// project-run flags, a document-level run replaces prior flags for that
/// document only. The distinction matters because project-level rules may
/// still link a flag to a document (e.g. totals reconciliation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagOrigin {
    ProjectValidation,
    DocumentValidation,
}

/// A validation flag raised by a rule check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFlag {
    pub id: FlagId,
    pub project_id: ProjectId,
    pub origin: FlagOrigin,

    /// Stable rule code, e.g. `MISSING_CONSUMPTION`
    pub code: &'static str,
    pub category: FlagCategory,
    pub severity: FlagSeverity,

    /// Human-readable description of the issue
    pub message: String,
    /// What to do next
    pub suggestion: Option<String>,

    /// Optional linkage to the document/field the issue concerns
    pub document_id: Option<DocumentId>,
    pub field_name: Option<String>,

    pub expected_value: Option<String>,
    pub actual_value: Option<String>,

    /// Free-form context data
    pub context: Option<serde_json::Value>,

    /// Resolved: the underlying data problem was fixed
    pub is_resolved: bool,
    /// Acknowledged: a reviewer has overridden the flag without fixing the
    /// data. Independent of `is_resolved`; both facts are retained.
    pub is_acknowledged: bool,
    pub resolution_note: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl ValidationFlag {
    /// Starts building a flag
    pub fn builder(
        project_id: ProjectId,
        origin: FlagOrigin,
        code: &'static str,
        category: FlagCategory,
        severity: FlagSeverity,
        message: impl Into<String>,
    ) -> FlagBuilder {
        FlagBuilder {
            flag: ValidationFlag {
                id: FlagId::generate(),
                project_id,
                origin,
                code,
                category,
                severity,
                message: message.into(),
                suggestion: None,
                document_id: None,
                field_name: None,
                expected_value: None,
                actual_value: None,
                context: None,
                is_resolved: false,
                is_acknowledged: false,
                resolution_note: None,
                created_at: Utc::now(),
            },
        }
    }

    /// Whether this flag currently blocks export: blocking severity and
    /// neither resolved nor acknowledged
    pub fn blocks_export(&self) -> bool {
        self.severity == FlagSeverity::Blocking && !self.is_resolved && !self.is_acknowledged
    }

    /// Identity key used to carry acknowledgement/resolution state across
    /// regeneration: a regenerated flag with the same key is the same issue.
    pub fn supersession_key(&self) -> (&'static str, Option<&DocumentId>, Option<&str>) {
        (self.code, self.document_id.as_ref(), self.field_name.as_deref())
    }
}

/// Builder for [`ValidationFlag`]
#[derive(Debug)]
pub struct FlagBuilder {
    flag: ValidationFlag,
}

impl FlagBuilder {
    /// Sets the "what to do next" suggestion
    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.flag.suggestion = Some(suggestion.into());
        self
    }

    /// Links the flag to a document
    pub fn document(mut self, document_id: DocumentId) -> Self {
        self.flag.document_id = Some(document_id);
        self
    }

    /// Links the flag to a named field
    pub fn field(mut self, field_name: impl Into<String>) -> Self {
        self.flag.field_name = Some(field_name.into());
        self
    }

    /// Records the expected value
    pub fn expected(mut self, value: impl Into<String>) -> Self {
        self.flag.expected_value = Some(value.into());
        self
    }

    /// Records the actual value
    pub fn actual(mut self, value: impl Into<String>) -> Self {
        self.flag.actual_value = Some(value.into());
        self
    }

    /// Attaches free-form context data
    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.flag.context = Some(context);
        self
    }

    /// Finishes the flag
    pub fn build(self) -> ValidationFlag {
        self.flag
    }
}
