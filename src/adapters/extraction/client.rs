//! Extraction client factory
//!
//! Wraps a provider implementation selected once from configuration:
//! an API key in the `[extraction]` section selects the live OpenAI
//! provider, its absence selects the deterministic stub.

use super::openai::OpenAiExtractionProvider;
use super::provider::{ExtractionOutcome, ExtractionProvider};
use super::stub::StubExtractionProvider;
use crate::config::ExtractionConfig;
use crate::domain::{DocumentId, ExtractionError, Result};
use std::sync::Arc;

/// Extraction client that wraps a provider implementation
pub struct ExtractionClient {
    provider: Arc<dyn ExtractionProvider>,
}

impl ExtractionClient {
    /// Create a client, resolving the provider from configuration presence
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let provider: Arc<dyn ExtractionProvider> = if config.api_key.is_some() {
            Arc::new(OpenAiExtractionProvider::new(config.clone())?)
        } else {
            tracing::info!("No extraction API key configured, using stub provider");
            Arc::new(StubExtractionProvider::new())
        };
        Ok(Self { provider })
    }

    /// Create a client around an explicit provider (used by tests)
    pub fn with_provider(provider: Arc<dyn ExtractionProvider>) -> Self {
        Self { provider }
    }

    /// Extract structured data from recognized text
    pub async fn extract(
        &self,
        full_text: &str,
        document_id: &DocumentId,
    ) -> std::result::Result<ExtractionOutcome, ExtractionError> {
        self.provider.extract(full_text, document_id).await
    }

    /// Name of the selected provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}
