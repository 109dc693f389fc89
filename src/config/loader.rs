//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::MeterboxConfig;
use super::secret::SecretValue;
use crate::domain::errors::MeterboxError;
use crate::domain::result::Result;
use regex::Regex;
use secrecy::Secret;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`MeterboxConfig`]
/// 4. Applies environment variable overrides (`METERBOX_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, TOML parsing fails, a
/// referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use meterbox::config::load_config;
///
/// let config = load_config("meterbox.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<MeterboxConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MeterboxError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        MeterboxError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: MeterboxConfig = toml::from_str(&contents)
        .map_err(|e| MeterboxError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        MeterboxError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. Returns an error naming every missing
/// variable at once.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex");
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let substituted = re.replace_all(line, |caps: &regex::Captures<'_>| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing_vars.push(var_name.to_string());
                    String::new()
                }
            }
        });
        result.push_str(&substituted);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(MeterboxError::Configuration(format!(
            "Missing environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies `METERBOX_*` environment variable overrides
///
/// Overrides win over file values. API keys in particular are usually
/// supplied this way instead of living in the TOML file.
fn apply_env_overrides(config: &mut MeterboxConfig) {
    if let Ok(level) = std::env::var("METERBOX_LOG_LEVEL") {
        config.application.log_level = level;
    }
    if let Ok(key) = std::env::var("METERBOX_RECOGNITION_API_KEY") {
        if !key.is_empty() {
            config.recognition.api_key = Some(Secret::new(SecretValue::from(key)));
        }
    }
    if let Ok(key) = std::env::var("METERBOX_EXTRACTION_API_KEY") {
        if !key.is_empty() {
            config.extraction.api_key = Some(Secret::new(SecretValue::from(key)));
        }
    }
    if let Ok(tolerance) = std::env::var("METERBOX_TOTALS_TOLERANCE_PERCENT") {
        if let Ok(value) = tolerance.parse::<f64>() {
            config.validation.totals_tolerance_percent = value;
        }
    }
}
