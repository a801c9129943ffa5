//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::LoggingConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::handler::HandlerError;

/// Error type for configuration loading and handler construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Handler setup failed: {0}")]
    Encoding(#[source] HandlerError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoggingConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    tracing::debug!(path = ?path, format = ?config.format, "Logging configuration loaded");
    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<LoggingConfig, ConfigError> {
    let config: LoggingConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Format;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.format, Format::Pretty);
        assert_eq!(config.level, "info");
        assert!(config.trace_context);
        assert_eq!(config.http.exclude_headers, vec!["authorization", "cookie"]);
    }

    #[test]
    fn test_full_config() {
        let config = parse_config(
            r#"
            format = "cloud"
            level = "warning"
            add_source = true

            [cloud]
            service_name = "checkout"
            service_version = "1.4.0"
            gcp_project_id = "shop-prod"

            [http]
            log_request = true
            exclude_headers = ["Authorization"]
            "#,
        )
        .unwrap();
        assert_eq!(config.format, Format::Cloud);
        assert!(config.add_source);
        assert_eq!(config.cloud.gcp_project_id, "shop-prod");
        assert!(config.http.log_request);
        assert!(config.http.add_trace);
    }

    #[test]
    fn test_unsupported_encoding_rejected_at_load() {
        let err = parse_config("[pretty]\nencoding = \"xml\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors)
                if errors == &[ValidationError::UnsupportedEncoding("xml".into())]
        ));
        assert!(err.to_string().contains("xml"), "{err}");
    }

    #[test]
    fn test_unknown_format_is_parse_error() {
        assert!(matches!(
            parse_config("format = \"xml\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/logweave.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
