//! Deterministic recognition stub
//!
//! Used when no recognition API key is configured and throughout the test
//! suite. Always returns the same one-page bill.

use super::provider::{RecognitionOutcome, RecognitionProvider, RecognizedPage};
use crate::domain::{DocumentLanguage, RecognitionError};
use async_trait::async_trait;

const STUB_PAGE: &str = r#"# Electricity Bill

**Supplier:** Energy Corp
**Account Number:** 12345678

## Billing Period
From: January 1, 2024
To: January 31, 2024

## Consumption Details
| Meter ID | Reading Start | Reading End | Consumption |
|----------|---------------|-------------|-------------|
| MTR-001  | 10000 kWh     | 10500 kWh   | 500 kWh     |
| MTR-002  | 25000 kWh     | 25750 kWh   | 750 kWh     |

## Total
**Total Consumption:** 1,250 kWh (1.25 MWh)
**Total Amount:** EUR 187.50
"#;

/// Stub recognition provider returning a fixed one-page bill
#[derive(Debug, Default)]
pub struct StubRecognitionProvider;

#[async_trait]
impl RecognitionProvider for StubRecognitionProvider {
    async fn recognize(
        &self,
        _content: &[u8],
    ) -> std::result::Result<RecognitionOutcome, RecognitionError> {
        Ok(RecognitionOutcome {
            pages: vec![RecognizedPage {
                number: 1,
                text: STUB_PAGE.to_string(),
            }],
            page_count: 1,
            detected_language: DocumentLanguage::En,
            confidence: 0.95,
            processing_time_seconds: 0.1,
            raw_response: serde_json::json!({"stub": true}),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_is_deterministic() {
        let provider = StubRecognitionProvider;
        let a = provider.recognize(b"anything").await.unwrap();
        let b = provider.recognize(b"something else").await.unwrap();
        assert_eq!(a.pages[0].text, b.pages[0].text);
        assert_eq!(a.page_count, 1);
        assert_eq!(a.detected_language, DocumentLanguage::En);
        assert!(a.pages[0].text.contains("1,250 kWh"));
    }
}
