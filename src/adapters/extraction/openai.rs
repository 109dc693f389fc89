//! OpenAI extraction provider implementation
//!
//! Live extraction provider backed by the chat completions API. The
//! recognized markdown is sent with a structured-output prompt; the model's
//! JSON reply is mapped into the canonical record and field drafts.
//!
//! Fine-tuned models (id prefixed `ft:`) do not accept the `response_format`
//! parameter, so it is attached only for base models. Replies wrapped in
//! markdown code fences are unwrapped before parsing.

use super::mapping::outcome_from_json;
use super::provider::{ExtractionOutcome, ExtractionProvider};
use crate::config::ExtractionConfig;
use crate::domain::{DocumentId, ExtractionError, MeterboxError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};

const SYSTEM_PROMPT: &str = "You extract structured data from energy bills. \
Reply with a single JSON object with these keys: supplier (string), \
account_number (string), billing_period (object with start_date and end_date \
as YYYY-MM-DD strings and period_string), site_address (string), \
meter_readings (array of objects with meter_id, reading_start, reading_end, \
consumption, unit), line_items (array of objects with description, quantity, \
unit, amount, currency), total_consumption (object with value and unit), \
total_amount (object with value and currency), and evidence (array of \
objects with field, page, quote, confidence). Omit keys you cannot find. \
Never invent values.";

/// OpenAI chat-completions extraction provider
pub struct OpenAiExtractionProvider {
    client: Client,
    config: ExtractionConfig,
}

impl OpenAiExtractionProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is present or the HTTP
    /// client cannot be built.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(MeterboxError::Configuration(
                "extraction api_key is required for the live provider".to_string(),
            ));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                MeterboxError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn request_body(&self, full_text: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.effective_model(),
            "temperature": 0.1,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": full_text},
            ],
        });
        if !self.config.is_finetuned() {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }
        body
    }

    async fn send_request(
        &self,
        full_text: &str,
    ) -> std::result::Result<serde_json::Value, ExtractionError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .expect("api_key checked at construction");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret().as_ref()),
            )
            .json(&self.request_body(full_text))
            .send()
            .await
            .map_err(|e| ExtractionError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Provider(format!(
                "status {status}: {body}"
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl ExtractionProvider for OpenAiExtractionProvider {
    async fn extract(
        &self,
        full_text: &str,
        document_id: &DocumentId,
    ) -> std::result::Result<ExtractionOutcome, ExtractionError> {
        let started = Instant::now();
        let raw = self.send_request(full_text).await?;

        let content = raw
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ExtractionError::MalformedResponse(
                    "response contains no message content".to_string(),
                )
            })?;

        let data = parse_model_reply(content)?;

        Ok(outcome_from_json(
            data,
            document_id,
            self.config.effective_model(),
            started.elapsed().as_secs_f64(),
        ))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Parse the model's reply, unwrapping markdown code fences if present
fn parse_model_reply(content: &str) -> std::result::Result<serde_json::Value, ExtractionError> {
    let trimmed = content.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    serde_json::from_str(inner).map_err(|e| {
        let excerpt: String = inner.chars().take(200).collect();
        ExtractionError::MalformedResponse(format!("invalid JSON ({e}): {excerpt}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_reply_plain_json() {
        let data = parse_model_reply(r#"{"supplier": "Energy Corp"}"#).unwrap();
        assert_eq!(data["supplier"], "Energy Corp");
    }

    #[test]
    fn test_parse_model_reply_fenced_json() {
        let data =
            parse_model_reply("```json\n{\"supplier\": \"Energy Corp\"}\n```").unwrap();
        assert_eq!(data["supplier"], "Energy Corp");

        let data = parse_model_reply("```\n{\"supplier\": \"Energy Corp\"}\n```").unwrap();
        assert_eq!(data["supplier"], "Energy Corp");
    }

    #[test]
    fn test_parse_model_reply_invalid() {
        let err = parse_model_reply("not json at all").unwrap_err();
        assert!(matches!(err, ExtractionError::MalformedResponse(_)));
    }

    #[test]
    fn test_response_format_omitted_for_finetuned_model() {
        use crate::config::SecretValue;
        use secrecy::Secret;

        let mut config = ExtractionConfig::default();
        config.api_key = Some(Secret::new(SecretValue::from("key".to_string())));

        let base = OpenAiExtractionProvider::new(config.clone()).unwrap();
        assert!(base.request_body("text").get("response_format").is_some());

        config.finetuned_model = Some("ft:gpt-4:acme::abc123".to_string());
        let tuned = OpenAiExtractionProvider::new(config).unwrap();
        let body = tuned.request_body("text");
        assert!(body.get("response_format").is_none());
        assert_eq!(body["model"], "ft:gpt-4:acme::abc123");
    }

    #[test]
    fn test_provider_requires_api_key() {
        let config = ExtractionConfig::default();
        assert!(OpenAiExtractionProvider::new(config).is_err());
    }
}
