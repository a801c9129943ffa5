//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! default every field so that an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Output format of the configured handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Colorized single-line output for terminals.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
    /// Google Cloud Logging structured JSON.
    Cloud,
}

/// Root logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: Format,

    /// Minimum level: a severity name (`debug`, `notice`, `warning`, ...),
    /// a level with offset (`info+2`), or an integer.
    pub level: String,

    /// Emit the call site of each record.
    pub add_source: bool,

    /// Inject the active OpenTelemetry trace into every record.
    pub trace_context: bool,

    pub pretty: PrettySettings,
    pub cloud: CloudSettings,
    pub http: HttpSettings,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: Format::default(),
            level: "info".to_string(),
            add_source: false,
            trace_context: true,
            pretty: PrettySettings::default(),
            cloud: CloudSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

/// Pretty formatter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrettySettings {
    pub color: bool,
    /// Render `{}` for records without attributes.
    pub output_empty_attrs: bool,
    /// Attribute block encoding: `json` or `yaml`.
    pub encoding: String,
}

impl Default for PrettySettings {
    fn default() -> Self {
        Self {
            color: true,
            output_empty_attrs: true,
            encoding: "json".to_string(),
        }
    }
}

/// Cloud Logging settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CloudSettings {
    pub service_name: String,
    pub service_version: String,
    /// Project id used in trace resource names.
    pub gcp_project_id: String,
}

/// Request logging middleware settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Bind trace and span ids of the request's span.
    pub add_trace: bool,
    /// Log one record per request with its metadata.
    pub log_request: bool,
    /// Headers never logged. Matching ignores case.
    pub exclude_headers: Vec<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            add_trace: true,
            log_request: false,
            exclude_headers: vec!["authorization".to_string(), "cookie".to_string()],
        }
    }
}
