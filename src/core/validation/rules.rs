//! Validation rules
//!
//! Pure rule functions over a gathered project (or document) view. Rules
//! are independent and run unconditionally; the caller fixes their order,
//! so flag output order is stable. Data problems always surface as flags,
//! never as errors.

use crate::config::ValidationConfig;
use crate::core::units;
use crate::domain::{
    BillRecord, CanonicalRecord, Document, FlagCategory, FlagOrigin, FlagSeverity, ProjectId,
    ProjectSettings, ValidationFlag,
};
use std::collections::BTreeSet;

/// Everything the project-level rules look at
pub struct ProjectView {
    pub project_id: ProjectId,
    pub settings: ProjectSettings,
    pub documents: Vec<Document>,
    /// Bill records from every current extraction, in document order
    pub bills: Vec<BillRecord>,
    /// Total normalized consumption in MWh
    pub total_mwh: f64,
}

fn flag(
    view: &ProjectView,
    code: &'static str,
    category: FlagCategory,
    severity: FlagSeverity,
    message: impl Into<String>,
) -> crate::domain::flags::FlagBuilder {
    ValidationFlag::builder(
        view.project_id.clone(),
        FlagOrigin::ProjectValidation,
        code,
        category,
        severity,
        message,
    )
}

/// Completeness: reporting settings, consumption data, declarant identity
pub fn check_completeness(view: &ProjectView, flags: &mut Vec<ValidationFlag>) {
    if view.settings.reporting_period.is_none() {
        flags.push(
            flag(
                view,
                "MISSING_REPORTING_PERIOD",
                FlagCategory::MissingRequired,
                FlagSeverity::Warning,
                "No reporting period is set for the project",
            )
            .suggestion("Select a reporting quarter in project settings")
            .build(),
        );
    }
    if view.settings.reporting_year.is_none() {
        flags.push(
            flag(
                view,
                "MISSING_REPORTING_YEAR",
                FlagCategory::MissingRequired,
                FlagSeverity::Warning,
                "No reporting year is set for the project",
            )
            .suggestion("Enter the reporting year in project settings")
            .build(),
        );
    }
    if view.total_mwh == 0.0 {
        flags.push(
            flag(
                view,
                "MISSING_CONSUMPTION",
                FlagCategory::MissingRequired,
                FlagSeverity::Blocking,
                "No electricity consumption data found across project documents",
            )
            .suggestion("Upload electricity bills or enter consumption manually")
            .build(),
        );
    }

    let declarant = view.settings.declarant.as_ref();
    match declarant {
        None => flags.push(
            flag(
                view,
                "MISSING_DECLARANT",
                FlagCategory::MissingRequired,
                FlagSeverity::Blocking,
                "Declarant information is missing",
            )
            .suggestion("Enter declarant details in project settings")
            .build(),
        ),
        Some(info) => {
            if info.name.as_deref().map_or(true, str::is_empty) {
                flags.push(
                    flag(
                        view,
                        "MISSING_DECLARANT",
                        FlagCategory::MissingRequired,
                        FlagSeverity::Blocking,
                        "Declarant name is missing",
                    )
                    .suggestion("Enter the declarant name in project settings")
                    .build(),
                );
            }
            if info
                .identification_number
                .as_deref()
                .map_or(true, str::is_empty)
            {
                flags.push(
                    flag(
                        view,
                        "MISSING_DECLARANT_ID",
                        FlagCategory::MissingRequired,
                        FlagSeverity::Blocking,
                        "Declarant identification number is missing",
                    )
                    .suggestion("Enter the declarant identification number (EORI)")
                    .build(),
                );
            }
        }
    }
}

/// Unit consistency: mixed unit strings and units outside the recognized set
pub fn check_unit_consistency(view: &ProjectView, flags: &mut Vec<ValidationFlag>) {
    let units_seen: BTreeSet<&str> = view
        .bills
        .iter()
        .filter_map(|b| b.total_consumption.as_ref())
        .map(|q| q.unit.as_str())
        .collect();

    if units_seen.len() > 1 {
        let listed: Vec<&str> = units_seen.iter().copied().collect();
        flags.push(
            flag(
                view,
                "UNIT_MIXED",
                FlagCategory::UnitConsistency,
                FlagSeverity::Warning,
                format!(
                    "Documents use mixed consumption units: {}",
                    listed.join(", ")
                ),
            )
            .context(serde_json::json!({ "units": listed }))
            .build(),
        );
    }

    for unit in &units_seen {
        if !units::is_recognized_unit(unit) {
            flags.push(
                flag(
                    view,
                    "UNIT_UNRECOGNIZED",
                    FlagCategory::UnitConsistency,
                    FlagSeverity::Warning,
                    format!("Unit '{unit}' is not recognized and was treated as kWh"),
                )
                .actual((*unit).to_string())
                .suggestion("Check the extracted unit and correct it if needed")
                .build(),
            );
        }
    }
}

/// Totals reconciliation: bill total vs the sum of its line-item quantities
pub fn check_totals_reconciliation(
    view: &ProjectView,
    config: &ValidationConfig,
    flags: &mut Vec<ValidationFlag>,
) {
    for bill in &view.bills {
        let Some(total) = bill.total_consumption.as_ref() else {
            continue;
        };
        if total.normalized_mwh == 0.0 {
            continue;
        }

        let line_sum_mwh: f64 = bill
            .line_items
            .iter()
            .filter_map(|item| {
                let quantity = item.quantity?;
                let unit = item.unit.as_deref()?;
                Some(units::normalize_to_mwh(quantity, unit))
            })
            .sum();
        if line_sum_mwh == 0.0 {
            continue;
        }

        let difference_percent =
            ((total.normalized_mwh - line_sum_mwh).abs() / total.normalized_mwh) * 100.0;
        if difference_percent > config.totals_tolerance_percent {
            flags.push(
                flag(
                    view,
                    "TOTAL_LINE_MISMATCH",
                    FlagCategory::TotalsMismatch,
                    FlagSeverity::Warning,
                    format!(
                        "Bill total {:.3} MWh differs from line-item sum {:.3} MWh by {:.1}%",
                        total.normalized_mwh, line_sum_mwh, difference_percent
                    ),
                )
                .document(bill.document_id.clone())
                .expected(format!("{:.3}", total.normalized_mwh))
                .actual(format!("{line_sum_mwh:.3}"))
                .context(serde_json::json!({ "difference_percent": difference_percent }))
                .build(),
            );
        }
    }
}

/// Period overlap: every unordered pair of bills with fully parsed periods
pub fn check_period_overlap(view: &ProjectView, flags: &mut Vec<ValidationFlag>) {
    for i in 0..view.bills.len() {
        for j in (i + 1)..view.bills.len() {
            let (a, b) = (&view.bills[i], &view.bills[j]);
            if !a.billing_period.overlaps(&b.billing_period) {
                continue;
            }
            flags.push(
                flag(
                    view,
                    "PERIOD_OVERLAP",
                    FlagCategory::PeriodOverlap,
                    FlagSeverity::Warning,
                    format!(
                        "Billing periods overlap between documents {} and {}",
                        a.document_id, b.document_id
                    ),
                )
                .document(a.document_id.clone())
                .context(serde_json::json!({
                    "other_document_id": b.document_id.as_str(),
                    "period_a": [a.billing_period.start_date, a.billing_period.end_date],
                    "period_b": [b.billing_period.start_date, b.billing_period.end_date],
                }))
                .build(),
            );
        }
    }
}

/// Confidence: inert unless a threshold is configured
pub fn check_confidence(
    view: &ProjectView,
    config: &ValidationConfig,
    flags: &mut Vec<ValidationFlag>,
) {
    let Some(threshold) = config.confidence_threshold else {
        return;
    };
    for document in &view.documents {
        let Some(confidence) = document.recognition_confidence else {
            continue;
        };
        if confidence < threshold {
            flags.push(
                flag(
                    view,
                    "LOW_RECOGNITION_CONFIDENCE",
                    FlagCategory::ExtractionConfidence,
                    FlagSeverity::Warning,
                    format!(
                        "Recognition confidence {confidence:.2} is below the threshold {threshold:.2}"
                    ),
                )
                .document(document.id.clone())
                .actual(format!("{confidence:.2}"))
                .expected(format!(">= {threshold:.2}"))
                .build(),
            );
        }
    }
}

/// Emission-factor configuration sanity
pub fn check_emission_factor(view: &ProjectView, flags: &mut Vec<ValidationFlag>) {
    use crate::domain::EmissionFactorSource;
    let factor = &view.settings.emission_factor;
    if factor.source == EmissionFactorSource::Provided && factor.value.is_none() {
        flags.push(
            flag(
                view,
                "EMISSION_FACTOR_MISSING_VALUE",
                FlagCategory::DataQuality,
                FlagSeverity::Warning,
                "Emission-factor source is set to 'provided' but no value is configured",
            )
            .suggestion("Enter the emission factor value or switch to the commission default")
            .build(),
        );
    }
}

/// Document-level rules over one document's current canonical record
pub fn check_document(document: &Document, record: &CanonicalRecord) -> Vec<ValidationFlag> {
    let mut flags = Vec::new();
    let doc_flag = |code: &'static str,
                    category: FlagCategory,
                    severity: FlagSeverity,
                    message: String| {
        ValidationFlag::builder(
            document.project_id.clone(),
            FlagOrigin::DocumentValidation,
            code,
            category,
            severity,
            message,
        )
        .document(document.id.clone())
    };

    if record.bills.is_empty() {
        flags.push(
            doc_flag(
                "NO_BILLS_EXTRACTED",
                FlagCategory::DataQuality,
                FlagSeverity::Warning,
                format!(
                    "Extraction produced no bill data for '{}'",
                    document.original_filename
                ),
            )
            .build(),
        );
        return flags;
    }

    for bill in &record.bills {
        if bill.total_consumption.is_none() {
            flags.push(
                doc_flag(
                    "MISSING_TOTAL_CONSUMPTION",
                    FlagCategory::MissingRequired,
                    FlagSeverity::Blocking,
                    format!(
                        "No total consumption extracted from '{}'",
                        document.original_filename
                    ),
                )
                .field("total_consumption")
                .suggestion("Enter the total consumption manually")
                .build(),
            );
        }
        if bill.billing_period.is_empty() {
            flags.push(
                doc_flag(
                    "MISSING_BILLING_PERIOD",
                    FlagCategory::MissingRequired,
                    FlagSeverity::Blocking,
                    format!(
                        "No billing period dates extracted from '{}'",
                        document.original_filename
                    ),
                )
                .field("period_start")
                .suggestion("Enter the billing period start and end dates")
                .build(),
            );
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        DeclarantInfo, DocumentId, EnergyQuantity, LineItem, ReportingPeriod,
    };

    fn complete_settings() -> ProjectSettings {
        ProjectSettings {
            reporting_period: Some(ReportingPeriod::Q1),
            reporting_year: Some("2024".to_string()),
            declarant: Some(DeclarantInfo {
                name: Some("Acme Steel".to_string()),
                identification_number: Some("DE1234567".to_string()),
                address: None,
            }),
            ..Default::default()
        }
    }

    fn bill_with_total(doc: &str, value: f64, unit: &str) -> BillRecord {
        let mut bill = BillRecord::empty(DocumentId::new(doc).unwrap());
        bill.total_consumption = Some(EnergyQuantity::new(value, unit));
        bill
    }

    fn view(settings: ProjectSettings, bills: Vec<BillRecord>) -> ProjectView {
        let total_mwh = bills.iter().map(BillRecord::normalized_total_mwh).sum();
        ProjectView {
            project_id: ProjectId::new("proj-1").unwrap(),
            settings,
            documents: Vec::new(),
            bills,
            total_mwh,
        }
    }

    #[test]
    fn test_complete_project_raises_no_completeness_flags() {
        let v = view(
            complete_settings(),
            vec![bill_with_total("doc-1", 1250.0, "kWh")],
        );
        let mut flags = Vec::new();
        check_completeness(&v, &mut flags);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_zero_consumption_blocks() {
        let v = view(complete_settings(), vec![]);
        let mut flags = Vec::new();
        check_completeness(&v, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "MISSING_CONSUMPTION");
        assert_eq!(flags[0].severity, FlagSeverity::Blocking);
    }

    #[test]
    fn test_missing_declarant_id_blocks() {
        let mut settings = complete_settings();
        settings.declarant.as_mut().unwrap().identification_number = None;
        let v = view(settings, vec![bill_with_total("doc-1", 1250.0, "kWh")]);
        let mut flags = Vec::new();
        check_completeness(&v, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "MISSING_DECLARANT_ID");
    }

    #[test]
    fn test_mixed_units_warn() {
        let v = view(
            complete_settings(),
            vec![
                bill_with_total("doc-1", 1250.0, "kWh"),
                bill_with_total("doc-2", 2.0, "MWh"),
            ],
        );
        let mut flags = Vec::new();
        check_unit_consistency(&v, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "UNIT_MIXED");
        assert_eq!(flags[0].severity, FlagSeverity::Warning);
    }

    #[test]
    fn test_unrecognized_unit_warns() {
        let v = view(
            complete_settings(),
            vec![bill_with_total("doc-1", 100.0, "therms")],
        );
        let mut flags = Vec::new();
        check_unit_consistency(&v, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "UNIT_UNRECOGNIZED");
    }

    #[test]
    fn test_totals_tolerance_boundary() {
        let mut bill = bill_with_total("doc-1", 1000.0, "kWh");
        bill.line_items = vec![LineItem {
            description: Some("Day rate".to_string()),
            quantity: Some(950.0),
            unit: Some("kWh".to_string()),
            amount: None,
            currency: None,
        }];
        let v = view(complete_settings(), vec![bill]);

        // 5% off: flagged under the 1% default tolerance.
        let mut flags = Vec::new();
        let tight = ValidationConfig::default();
        check_totals_reconciliation(&v, &tight, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "TOTAL_LINE_MISMATCH");

        // Same data passes a 10% tolerance.
        let mut loose = ValidationConfig::default();
        loose.totals_tolerance_percent = 10.0;
        let mut flags = Vec::new();
        check_totals_reconciliation(&v, &loose, &mut flags);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_period_overlap_pairs() {
        let mut a = bill_with_total("doc-1", 100.0, "kWh");
        a.billing_period.start_date = "2024-01-01".parse().ok();
        a.billing_period.end_date = "2024-01-31".parse().ok();
        let mut b = bill_with_total("doc-2", 100.0, "kWh");
        b.billing_period.start_date = "2024-01-15".parse().ok();
        b.billing_period.end_date = "2024-02-15".parse().ok();
        let mut c = bill_with_total("doc-3", 100.0, "kWh");
        c.billing_period.start_date = "2024-03-01".parse().ok();
        c.billing_period.end_date = "2024-03-31".parse().ok();

        let v = view(complete_settings(), vec![a, b, c]);
        let mut flags = Vec::new();
        check_period_overlap(&v, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "PERIOD_OVERLAP");
    }

    #[test]
    fn test_confidence_rule_inert_without_threshold() {
        let mut v = view(complete_settings(), vec![]);
        let mut doc = Document::new(
            DocumentId::new("doc-1").unwrap(),
            v.project_id.clone(),
            "doc-1.pdf",
            "bill.pdf",
            None,
        );
        doc.recognition_confidence = Some(0.1);
        v.documents.push(doc);

        let mut flags = Vec::new();
        check_confidence(&v, &ValidationConfig::default(), &mut flags);
        assert!(flags.is_empty());

        let mut config = ValidationConfig::default();
        config.confidence_threshold = Some(0.5);
        check_confidence(&v, &config, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "LOW_RECOGNITION_CONFIDENCE");
    }

    #[test]
    fn test_emission_factor_provided_without_value_warns() {
        use crate::domain::{EmissionFactor, EmissionFactorSource};
        let mut settings = complete_settings();
        settings.emission_factor = EmissionFactor {
            source: EmissionFactorSource::Provided,
            value: None,
        };
        let v = view(settings, vec![]);
        let mut flags = Vec::new();
        check_emission_factor(&v, &mut flags);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "EMISSION_FACTOR_MISSING_VALUE");
    }

    #[test]
    fn test_document_rules() {
        let document = Document::new(
            DocumentId::new("doc-1").unwrap(),
            ProjectId::new("proj-1").unwrap(),
            "doc-1.pdf",
            "january.pdf",
            None,
        );

        let empty = CanonicalRecord::from_bills(vec![]);
        let flags = check_document(&document, &empty);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].code, "NO_BILLS_EXTRACTED");
        assert_eq!(flags[0].severity, FlagSeverity::Warning);

        let bare = CanonicalRecord::from_bills(vec![BillRecord::empty(document.id.clone())]);
        let flags = check_document(&document, &bare);
        let codes: Vec<&str> = flags.iter().map(|f| f.code).collect();
        assert_eq!(
            codes,
            vec!["MISSING_TOTAL_CONSUMPTION", "MISSING_BILLING_PERIOD"]
        );
        assert!(flags.iter().all(|f| f.severity == FlagSeverity::Blocking));
    }
}
