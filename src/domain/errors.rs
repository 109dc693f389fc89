//! Domain error types
//!
//! This module defines the error hierarchy for Meterbox. All errors are
//! domain-specific and don't expose third-party types: provider adapters
//! translate HTTP client failures into [`RecognitionError`] or
//! [`ExtractionError`] before they cross the adapter boundary.

use thiserror::Error;

/// Main Meterbox error type
///
/// This is the primary error type used throughout the engine.
/// It wraps stage-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum MeterboxError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Recognition-stage provider errors
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Extraction-stage provider errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record lookup failures (document, extraction, field or flag not found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invariant violations that must never be silently swallowed
    /// (e.g. a document in state `extracted` with no current extraction)
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Recognition provider errors
///
/// Failure modes of the text-recognition stage. Only [`Transport`] failures
/// are transient and eligible for in-adapter retry; everything else is a
/// provider rejection and propagates immediately.
///
/// [`Transport`]: RecognitionError::Transport
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Provider rejected the API credentials
    #[error("Recognition provider rejected credentials: {0}")]
    Unauthorized(String),

    /// Provider rate limit exceeded
    #[error("Recognition provider rate limit exceeded: {0}")]
    RateLimited(String),

    /// Request timed out
    #[error("Recognition request timed out: {0}")]
    Timeout(String),

    /// Transient transport failure (connection reset, mid-stream protocol error)
    #[error("Recognition transport error: {0}")]
    Transport(String),

    /// Provider returned a response the adapter could not interpret
    #[error("Invalid recognition response: {0}")]
    InvalidResponse(String),
}

impl RecognitionError {
    /// Whether this failure may be retried with backoff inside the adapter
    pub fn is_transient(&self) -> bool {
        matches!(self, RecognitionError::Transport(_))
    }
}

/// Extraction provider errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Provider output could not be parsed as the expected structure
    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),

    /// Provider-side failure (transport, timeout, server error)
    #[error("Extraction provider error: {0}")]
    Provider(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for MeterboxError {
    fn from(err: std::io::Error) -> Self {
        MeterboxError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MeterboxError {
    fn from(err: serde_json::Error) -> Self {
        MeterboxError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for MeterboxError {
    fn from(err: toml::de::Error) -> Self {
        MeterboxError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meterbox_error_display() {
        let err = MeterboxError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_recognition_error_conversion() {
        let rec_err = RecognitionError::Unauthorized("bad key".to_string());
        let err: MeterboxError = rec_err.into();
        assert!(matches!(err, MeterboxError::Recognition(_)));
    }

    #[test]
    fn test_extraction_error_conversion() {
        let ext_err = ExtractionError::MalformedResponse("not json".to_string());
        let err: MeterboxError = ext_err.into();
        assert!(matches!(err, MeterboxError::Extraction(_)));
    }

    #[test]
    fn test_only_transport_errors_are_transient() {
        assert!(RecognitionError::Transport("reset".to_string()).is_transient());
        assert!(!RecognitionError::Unauthorized("401".to_string()).is_transient());
        assert!(!RecognitionError::RateLimited("429".to_string()).is_transient());
        assert!(!RecognitionError::Timeout("deadline".to_string()).is_transient());
        assert!(!RecognitionError::InvalidResponse("empty".to_string()).is_transient());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: MeterboxError = io_err.into();
        assert!(matches!(err, MeterboxError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MeterboxError = toml_err.into();
        assert!(matches!(err, MeterboxError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = MeterboxError::Invariant("test".to_string());
        let _: &dyn std::error::Error = &err;
        let err = RecognitionError::Timeout("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
