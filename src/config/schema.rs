//! Configuration schema types
//!
//! This module defines the configuration structure for Meterbox. All
//! settings are explicit, immutable values constructed once at startup and
//! passed into each component's constructor — never ambient global state.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Main Meterbox configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeterboxConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Recognition provider configuration
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Extraction provider configuration
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Validation tunables
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeterboxConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.recognition.validate()?;
        self.extraction.validate()?;
        self.validation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name used in log output
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(format!(
                "Invalid log level '{other}'. Must be one of: trace, debug, info, warn, error"
            )),
        }
    }
}

/// Retry behavior for transient recognition transport failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first (4 = one call plus three retries)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each retry
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Upper bound on any single delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry max_attempts must be at least 1".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("retry backoff_multiplier must be at least 1.0".to_string());
        }
        Ok(())
    }

    /// Delay before retry number `retry` (1-based), capped at `max_delay_ms`
    pub fn delay_ms(&self, retry: u32) -> u64 {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        let delay = (self.initial_delay_ms as f64 * factor) as u64;
        delay.min(self.max_delay_ms)
    }
}

/// Recognition provider configuration
///
/// Provider selection happens once at startup: when `api_key` is present
/// the live HTTP provider is used, otherwise the deterministic stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Provider API key; absence selects the stub provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// OCR endpoint URL
    #[serde(default = "default_recognition_endpoint")]
    pub endpoint: String,

    /// Provider model identifier
    #[serde(default = "default_recognition_model")]
    pub model: String,

    /// Overall request timeout in seconds; recognition of large scans can
    /// take several minutes
    #[serde(default = "default_recognition_timeout")]
    pub timeout_seconds: u64,

    /// Connection-establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Retry behavior for transient transport failures
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_recognition_endpoint(),
            model: default_recognition_model(),
            timeout_seconds: default_recognition_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

impl RecognitionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("recognition endpoint cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 {
            return Err("recognition timeout_seconds must be positive".to_string());
        }
        self.retry.validate()
    }
}

/// Extraction provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Provider API key; absence selects the stub provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecretString>,

    /// Chat-completions endpoint URL
    #[serde(default = "default_extraction_endpoint")]
    pub endpoint: String,

    /// Base model identifier
    #[serde(default = "default_extraction_model")]
    pub model: String,

    /// Fine-tuned model id (`ft:` prefix); takes precedence over `model`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finetuned_model: Option<String>,

    /// Request timeout in seconds; extraction must finish well under two
    /// minutes
    #[serde(default = "default_extraction_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_extraction_endpoint(),
            model: default_extraction_model(),
            finetuned_model: None,
            timeout_seconds: default_extraction_timeout(),
        }
    }
}

impl ExtractionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("extraction endpoint cannot be empty".to_string());
        }
        if self.timeout_seconds == 0 || self.timeout_seconds > 120 {
            return Err("extraction timeout_seconds must be in 1..=120".to_string());
        }
        Ok(())
    }

    /// The model to request: the fine-tuned model when configured
    pub fn effective_model(&self) -> &str {
        self.finetuned_model.as_deref().unwrap_or(&self.model)
    }

    /// Whether the effective model is a fine-tune (fine-tuned models don't
    /// accept a response_format parameter)
    pub fn is_finetuned(&self) -> bool {
        self.finetuned_model
            .as_deref()
            .map(|m| m.starts_with("ft:"))
            .unwrap_or(false)
    }
}

/// Validation tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Tolerance for totals reconciliation, in percent
    #[serde(default = "default_totals_tolerance")]
    pub totals_tolerance_percent: f64,

    /// Field-confidence threshold in 0..=1; the confidence rule is a no-op
    /// when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            totals_tolerance_percent: default_totals_tolerance(),
            confidence_threshold: None,
        }
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.totals_tolerance_percent < 0.0 {
            return Err("totals_tolerance_percent cannot be negative".to_string());
        }
        if let Some(threshold) = self.confidence_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err("confidence_threshold must be within 0..=1".to_string());
            }
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON logs to rotating local files
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation policy: daily or hourly
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        match self.local_rotation.as_str() {
            "daily" | "hourly" => Ok(()),
            other => Err(format!(
                "Invalid log rotation '{other}'. Must be one of: daily, hourly"
            )),
        }
    }
}

fn default_app_name() -> String {
    "meterbox".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_attempts() -> u32 {
    4
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_recognition_endpoint() -> String {
    "https://api.mistral.ai/v1/ocr".to_string()
}

fn default_recognition_model() -> String {
    "mistral-ocr-latest".to_string()
}

fn default_recognition_timeout() -> u64 {
    240
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_extraction_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_extraction_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_extraction_timeout() -> u64 {
    90
}

fn default_totals_tolerance() -> f64 {
    1.0
}

fn default_log_path() -> String {
    "./logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
