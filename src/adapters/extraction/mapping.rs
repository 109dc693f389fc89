//! Mapping from provider JSON to the canonical record and field drafts
//!
//! Both the live provider and the stub produce the same JSON shape; this
//! module turns it into a [`CanonicalRecord`] plus [`FieldDraft`]s with
//! evidence joined from the response's `evidence` array.

use super::provider::{ExtractionOutcome, FieldDraft};
use crate::domain::{
    BillRecord, BillingPeriod, CanonicalRecord, DocumentId, EnergyQuantity, FieldType, LineItem,
    MeterReading,
};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;

/// Builds the full extraction outcome from a provider JSON document
pub(crate) fn outcome_from_json(
    data: Value,
    document_id: &DocumentId,
    model: impl Into<String>,
    processing_time_seconds: f64,
) -> ExtractionOutcome {
    let record = record_from_json(&data, document_id);
    let fields = fields_from_json(&data);
    ExtractionOutcome {
        fields,
        record,
        model: model.into(),
        processing_time_seconds,
        raw_response: data,
    }
}

/// Builds the document-scoped canonical record
///
/// One provider response describes one bill; multi-bill documents arrive as
/// multiple documents upstream.
fn record_from_json(data: &Value, document_id: &DocumentId) -> CanonicalRecord {
    let mut bill = BillRecord::empty(document_id.clone());

    bill.supplier = str_at(data, "supplier");
    bill.account_number = str_at(data, "account_number");
    bill.site_address = str_at(data, "site_address");

    if let Some(period) = data.get("billing_period") {
        bill.billing_period = BillingPeriod {
            start_date: parse_date(period.get("start_date")),
            end_date: parse_date(period.get("end_date")),
            period_string: str_at(period, "period_string"),
        };
    }

    if let Some(readings) = data.get("meter_readings").and_then(Value::as_array) {
        bill.meter_readings = readings
            .iter()
            .map(|reading| MeterReading {
                meter_id: str_at(reading, "meter_id"),
                reading_start: num_at(reading, "reading_start"),
                reading_end: num_at(reading, "reading_end"),
                consumption: num_at(reading, "consumption"),
                unit: str_at(reading, "unit"),
            })
            .collect();
    }

    if let Some(items) = data.get("line_items").and_then(Value::as_array) {
        bill.line_items = items
            .iter()
            .map(|item| LineItem {
                description: str_at(item, "description"),
                quantity: num_at(item, "quantity"),
                unit: str_at(item, "unit"),
                amount: num_at(item, "amount"),
                currency: str_at(item, "currency"),
            })
            .collect();
    }

    if let Some(total) = data.get("total_consumption") {
        if let Some(value) = num_at(total, "value") {
            // Missing unit falls back to kWh inside EnergyQuantity.
            let unit = str_at(total, "unit").unwrap_or_else(|| "kWh".to_string());
            bill.total_consumption = Some(EnergyQuantity::new(value, unit));
        }
    }

    if let Some(amount) = data.get("total_amount") {
        bill.total_amount = num_at(amount, "value");
        bill.currency = str_at(amount, "currency");
    }

    CanonicalRecord::from_bills(vec![bill])
}

/// Builds the per-field drafts with evidence for the review UI
fn fields_from_json(data: &Value) -> Vec<FieldDraft> {
    let evidence: HashMap<&str, &Value> = data
        .get("evidence")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| e.get("field").and_then(Value::as_str).map(|f| (f, e)))
                .collect()
        })
        .unwrap_or_default();

    let mut fields = Vec::new();
    let mut push = |name: String, field_type: FieldType, value: Option<String>, unit: Option<String>| {
        if value.is_none() {
            return;
        }
        let entry = evidence.get(name.as_str());
        fields.push(FieldDraft {
            name,
            field_type,
            value,
            unit,
            confidence: entry
                .and_then(|e| e.get("confidence").and_then(Value::as_f64))
                .or(Some(0.5)),
            source_page: entry.and_then(|e| e.get("page").and_then(Value::as_u64).map(|p| p as u32)),
            source_quote: entry.and_then(|e| str_at(e, "quote")),
        });
    };

    push(
        "supplier".to_string(),
        FieldType::Supplier,
        str_at(data, "supplier"),
        None,
    );
    push(
        "account_number".to_string(),
        FieldType::AccountNumber,
        str_at(data, "account_number"),
        None,
    );

    if let Some(period) = data.get("billing_period") {
        push(
            "period_start".to_string(),
            FieldType::PeriodStart,
            str_at(period, "start_date"),
            None,
        );
        push(
            "period_end".to_string(),
            FieldType::PeriodEnd,
            str_at(period, "end_date"),
            None,
        );
    }

    push(
        "site_address".to_string(),
        FieldType::SiteAddress,
        str_at(data, "site_address"),
        None,
    );

    if let Some(total) = data.get("total_consumption") {
        push(
            "total_consumption".to_string(),
            FieldType::TotalConsumption,
            num_at(total, "value").map(format_number),
            str_at(total, "unit"),
        );
    }

    if let Some(amount) = data.get("total_amount") {
        push(
            "total_amount".to_string(),
            FieldType::TotalAmount,
            num_at(amount, "value").map(format_number),
            str_at(amount, "currency"),
        );
    }

    if let Some(readings) = data.get("meter_readings").and_then(Value::as_array) {
        for (i, reading) in readings.iter().enumerate() {
            push(
                format!("meter_{i}_id"),
                FieldType::MeterId,
                str_at(reading, "meter_id"),
                None,
            );
            push(
                format!("meter_{i}_consumption"),
                FieldType::Consumption,
                num_at(reading, "consumption").map(format_number),
                str_at(reading, "unit"),
            );
        }
    }

    fields
}

fn str_at(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn num_at(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn parse_date(value: Option<&Value>) -> Option<NaiveDate> {
    value
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
