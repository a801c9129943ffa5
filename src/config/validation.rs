//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate enumerated string settings (level, encoding)
//! - Check format-specific requirements
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LoggingConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::cloud::lookup_level;
use crate::config::schema::{Format, LoggingConfig};
use crate::pretty::AttrEncoding;
use crate::record::Level;

/// A semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid level {0:?}")]
    InvalidLevel(String),

    #[error("unsupported pretty.encoding {0:?} (expected \"json\" or \"yaml\")")]
    UnsupportedEncoding(String),

    #[error("cloud.service_name is required when format = \"cloud\"")]
    MissingServiceName,

    #[error("http.exclude_headers contains an empty header name")]
    EmptyExcludedHeader,
}

/// Parse a configured level: severity names, offset names, or integers.
pub fn parse_level_setting(value: &str) -> Option<Level> {
    lookup_level(value).or_else(|| value.trim().parse::<Level>().ok())
}

/// Validate `config`, collecting every problem found.
pub fn validate_config(config: &LoggingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if parse_level_setting(&config.level).is_none() {
        errors.push(ValidationError::InvalidLevel(config.level.clone()));
    }

    if config.pretty.encoding.parse::<AttrEncoding>().is_err() {
        errors.push(ValidationError::UnsupportedEncoding(
            config.pretty.encoding.clone(),
        ));
    }

    if config.format == Format::Cloud && config.cloud.service_name.trim().is_empty() {
        errors.push(ValidationError::MissingServiceName);
    }

    if config.http.exclude_headers.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::EmptyExcludedHeader);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
