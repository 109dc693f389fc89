//! Result type alias for Meterbox
//!
//! This module provides a convenient Result type alias that uses
//! MeterboxError as the error type.

use super::errors::MeterboxError;

/// Result type alias for Meterbox operations
///
/// This is a convenience type alias that uses `MeterboxError` as the error type.
/// Use this throughout the codebase for fallible operations.
///
/// # Examples
///
/// ```
/// use meterbox::domain::result::Result;
/// use meterbox::domain::errors::MeterboxError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(MeterboxError::Configuration("missing section".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, MeterboxError>;
