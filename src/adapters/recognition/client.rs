//! Recognition client factory
//!
//! Wraps a provider implementation selected once from configuration:
//! an API key in the `[recognition]` section selects the live Mistral OCR
//! provider, its absence selects the deterministic stub.

use super::mistral::MistralOcrProvider;
use super::provider::{RecognitionOutcome, RecognitionProvider};
use super::stub::StubRecognitionProvider;
use crate::config::RecognitionConfig;
use crate::domain::{RecognitionError, Result};
use std::sync::Arc;

/// Recognition client that wraps a provider implementation
pub struct RecognitionClient {
    provider: Arc<dyn RecognitionProvider>,
}

impl RecognitionClient {
    /// Create a client, resolving the provider from configuration presence
    pub fn from_config(config: &RecognitionConfig) -> Result<Self> {
        let provider: Arc<dyn RecognitionProvider> = if config.api_key.is_some() {
            Arc::new(MistralOcrProvider::new(config.clone())?)
        } else {
            tracing::info!("No recognition API key configured, using stub provider");
            Arc::new(StubRecognitionProvider)
        };
        Ok(Self { provider })
    }

    /// Create a client around an explicit provider (used by tests)
    pub fn with_provider(provider: Arc<dyn RecognitionProvider>) -> Self {
        Self { provider }
    }

    /// Recognize a document's text from its raw bytes
    pub async fn recognize(
        &self,
        content: &[u8],
    ) -> std::result::Result<RecognitionOutcome, RecognitionError> {
        self.provider.recognize(content).await
    }

    /// Name of the selected provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
