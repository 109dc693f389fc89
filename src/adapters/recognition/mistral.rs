//! Mistral OCR provider implementation
//!
//! Live recognition provider backed by the Mistral OCR REST API. The
//! document is shipped as a base64 data-url; the response carries one
//! markdown blob per page.
//!
//! Retry policy: transient transport failures (connection reset, failure to
//! establish a connection, mid-stream protocol errors) are retried with
//! exponential backoff up to the configured attempt count. Authentication
//! rejections, rate limiting, request timeouts and malformed responses are
//! never retried. When retries exhaust, the last error surfaces as the
//! stage failure.

use super::provider::{RecognitionOutcome, RecognitionProvider, RecognizedPage};
use crate::config::RecognitionConfig;
use crate::domain::{DocumentLanguage, MeterboxError, RecognitionError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::{Duration, Instant};

/// Mistral OCR provider
pub struct MistralOcrProvider {
    client: Client,
    config: RecognitionConfig,
}

impl MistralOcrProvider {
    /// Create a provider from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no API key is present or the HTTP
    /// client cannot be built.
    pub fn new(config: RecognitionConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(MeterboxError::Configuration(
                "recognition api_key is required for the live provider".to_string(),
            ));
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .build()
            .map_err(|e| {
                MeterboxError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    async fn send_request(
        &self,
        document_url: &str,
    ) -> std::result::Result<serde_json::Value, RecognitionError> {
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
            .json(&serde_json::json!({
                "model": self.config.model,
                "document": {
                    "type": "document_url",
                    "document_url": document_url,
                },
                "include_image_base64": false,
            }))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status_error(status, body));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| RecognitionError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RecognitionProvider for MistralOcrProvider {
    async fn recognize(
        &self,
        content: &[u8],
    ) -> std::result::Result<RecognitionOutcome, RecognitionError> {
        let started = Instant::now();
        let encoded = general_purpose::STANDARD.encode(content);
        let document_url = format!("data:application/pdf;base64,{encoded}");

        let retry = &self.config.retry;
        let mut attempt: u32 = 0;
        let raw = loop {
            attempt += 1;
            match self.send_request(&document_url).await {
                Ok(raw) => break raw,
                Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                    let delay_ms = retry.delay_ms(attempt);
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = retry.max_attempts,
                        delay_ms = delay_ms,
                        error = %e,
                        "Transient recognition failure, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        };

        let pages = parse_pages(&raw)?;
        let detected_language = detect_language(&pages);
        let confidence = read_confidence(&raw, &pages);

        Ok(RecognitionOutcome {
            page_count: pages.len() as u32,
            pages,
            detected_language,
            confidence,
            processing_time_seconds: started.elapsed().as_secs_f64(),
            raw_response: raw,
        })
    }

    fn name(&self) -> &'static str {
        "mistral-ocr"
    }
}

fn classify_transport_error(err: reqwest::Error) -> RecognitionError {
    if err.is_timeout() {
        RecognitionError::Timeout(err.to_string())
    } else {
        RecognitionError::Transport(err.to_string())
    }
}

fn classify_status_error(status: StatusCode, body: String) -> RecognitionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RecognitionError::Unauthorized(format!("status {status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            RecognitionError::RateLimited(format!("status {status}: {body}"))
        }
        _ => RecognitionError::InvalidResponse(format!("status {status}: {body}")),
    }
}

/// Parse the provider response into page objects
///
/// Handles both the multi-page `pages` array and the single-blob `content`
/// fallback shape.
fn parse_pages(
    raw: &serde_json::Value,
) -> std::result::Result<Vec<RecognizedPage>, RecognitionError> {
    if let Some(pages) = raw.get("pages").and_then(|p| p.as_array()) {
        return Ok(pages
            .iter()
            .enumerate()
            .map(|(idx, page)| RecognizedPage {
                number: idx as u32 + 1,
                text: page
                    .get("markdown")
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect());
    }

    if let Some(content) = raw.get("content").and_then(|c| c.as_str()) {
        return Ok(vec![RecognizedPage {
            number: 1,
            text: content.to_string(),
        }]);
    }

    Err(RecognitionError::InvalidResponse(
        "response contains neither 'pages' nor 'content'".to_string(),
    ))
}

/// Detect the primary language from recognized text
///
/// Character-ratio heuristic: Arabic script ratio above 20% wins, then
/// French accented characters above 2%, otherwise English.
pub(crate) fn detect_language(pages: &[RecognizedPage]) -> DocumentLanguage {
    let all_text: String = pages.iter().map(|p| p.text.as_str()).collect();
    let total_chars = all_text.chars().filter(|c| !c.is_whitespace()).count();
    if total_chars == 0 {
        return DocumentLanguage::Unknown;
    }

    let arabic_chars = all_text
        .chars()
        .filter(|c| ('\u{0600}'..='\u{06FF}').contains(c))
        .count();
    let french_chars = all_text
        .chars()
        .filter(|c| "éèêëàâäùûüôöîïç".contains(*c))
        .count();

    let arabic_ratio = arabic_chars as f64 / total_chars as f64;
    let french_ratio = french_chars as f64 / total_chars as f64;

    if arabic_ratio > 0.2 {
        DocumentLanguage::Ar
    } else if french_ratio > 0.02 {
        DocumentLanguage::Fr
    } else {
        DocumentLanguage::En
    }
}

/// Provider-reported confidence when present, otherwise an estimate from
/// recognized text volume
fn read_confidence(raw: &serde_json::Value, pages: &[RecognizedPage]) -> f64 {
    if let Some(confidence) = raw.get("confidence").and_then(|c| c.as_f64()) {
        return confidence;
    }

    let total_chars: usize = pages.iter().map(|p| p.text.len()).sum();
    if total_chars > 100 {
        0.85
    } else if total_chars > 20 {
        0.6
    } else {
        0.3
    }
}
