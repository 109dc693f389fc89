//! Stub extraction provider for local development
//!
//! Returns a fixed structured bill regardless of input, paired with the
//! recognition stub so the full pipeline runs without provider credentials.

use super::mapping::outcome_from_json;
use super::provider::{ExtractionOutcome, ExtractionProvider};
use crate::domain::{DocumentId, ExtractionError};
use async_trait::async_trait;

/// Extraction provider returning canned structured data
#[derive(Debug, Default)]
pub struct StubExtractionProvider;

impl StubExtractionProvider {
    pub fn new() -> Self {
        Self
    }

    fn canned_response() -> serde_json::Value {
        serde_json::json!({
            "supplier": "Energy Corp",
            "account_number": "ACC-2024-0042",
            "billing_period": {
                "start_date": "2024-01-01",
                "end_date": "2024-01-31",
                "period_string": "1 January 2024 - 31 January 2024"
            },
            "site_address": "123 Industrial Way, Manufacturing City",
            "meter_readings": [
                {"meter_id": "MTR-001", "consumption": 500.0, "unit": "kWh"},
                {"meter_id": "MTR-002", "consumption": 750.0, "unit": "kWh"}
            ],
            "total_consumption": {"value": 1250.0, "unit": "kWh"},
            "total_amount": {"value": 187.50, "currency": "EUR"},
            "evidence": [
                {"field": "supplier", "page": 1, "quote": "Energy Corp", "confidence": 0.95},
                {"field": "total_consumption", "page": 1,
                 "quote": "Total Consumption: 1,250 kWh", "confidence": 0.92},
                {"field": "total_amount", "page": 1,
                 "quote": "Amount Due: EUR 187.50", "confidence": 0.9}
            ],
            "stub": true
        })
    }
}

#[async_trait]
impl ExtractionProvider for StubExtractionProvider {
    async fn extract(
        &self,
        _full_text: &str,
        document_id: &DocumentId,
    ) -> std::result::Result<ExtractionOutcome, ExtractionError> {
        Ok(outcome_from_json(
            Self::canned_response(),
            document_id,
            "stub",
            0.0,
        ))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
