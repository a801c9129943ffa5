//! Handler failure taxonomy.

use thiserror::Error;

/// Errors returned from [`Handler::handle`](super::Handler::handle).
///
/// None of these are retried; the record that failed is dropped.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The wrapped encoder rejected the record.
    #[error("inner handler failed to encode record: {0}")]
    InnerEncode(#[source] Box<HandlerError>),

    /// The captured encoder output is not a JSON object.
    #[error("failed to decode inner handler output: {0}")]
    Decode(#[source] serde_json::Error),

    /// Attributes could not be serialized as JSON.
    #[error("failed to encode attributes as JSON: {0}")]
    EncodeJson(#[source] serde_json::Error),

    /// Attributes could not be serialized as YAML.
    #[error("failed to encode attributes as YAML: {0}")]
    EncodeYaml(#[source] serde_yaml::Error),

    /// The destination sink rejected the write.
    #[error("failed to write log output: {0}")]
    Write(#[from] std::io::Error),

    /// The configured attribute encoding is not recognized.
    #[error("unsupported attribute encoding {0:?}")]
    UnsupportedEncoding(String),
}
