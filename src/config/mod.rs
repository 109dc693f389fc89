//! Configuration management for Meterbox.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Meterbox uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `METERBOX_*` environment variable overrides
//! - Default values for optional settings
//! - Secret handling for provider API keys
//!
//! Provider selection follows configuration presence: a section with an
//! `api_key` selects the live provider, a section without one selects the
//! deterministic stub. Selection is resolved once at startup.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [recognition]
//! api_key = "${METERBOX_RECOGNITION_API_KEY}"
//! timeout_seconds = 240
//!
//! [recognition.retry]
//! max_attempts = 4
//! initial_delay_ms = 1000
//!
//! [extraction]
//! api_key = "${METERBOX_EXTRACTION_API_KEY}"
//! model = "gpt-4-turbo-preview"
//!
//! [validation]
//! totals_tolerance_percent = 1.0
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExtractionConfig, LoggingConfig, MeterboxConfig, RecognitionConfig,
    RetryConfig, ValidationConfig,
};
pub use secret::{SecretString, SecretValue};
