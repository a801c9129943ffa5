//! Handler and middleware construction from configuration.

use std::sync::Arc;

use crate::cloud::{
    CloudHandler, CloudLoggingLayer, CloudMiddlewareOptions, CloudOptions, CloudRequestLogger,
};
use crate::config::loader::ConfigError;
use crate::config::schema::{Format, LoggingConfig};
use crate::config::validation::{parse_level_setting, ValidationError};
use crate::handler::{Handler, JsonHandler, JsonOptions, Sink};
use crate::http::{RequestLoggerLayer, RequestScoped};
use crate::logger::Logger;
use crate::otel::OtelHandler;
use crate::pretty::{AttrEncoding, PrettyHandler};

/// Build the handler chain described by `config`, writing to `sink`.
pub fn build_handler(config: &LoggingConfig, sink: Sink) -> Result<Arc<dyn Handler>, ConfigError> {
    let level = parse_level_setting(&config.level).ok_or_else(|| {
        ConfigError::Validation(vec![ValidationError::InvalidLevel(config.level.clone())])
    })?;

    let handler: Arc<dyn Handler> = match config.format {
        Format::Pretty => {
            let encoding: AttrEncoding =
                config.pretty.encoding.parse().map_err(ConfigError::Encoding)?;
            Arc::new(
                PrettyHandler::builder()
                    .sink(sink)
                    .color(config.pretty.color)
                    .output_empty_attrs(config.pretty.output_empty_attrs)
                    .encoding(encoding)
                    .level(level)
                    .add_source(config.add_source)
                    .build(),
            )
        }
        Format::Json => Arc::new(JsonHandler::new(
            sink,
            JsonOptions {
                level,
                add_source: config.add_source,
                replace_attr: None,
            },
        )),
        Format::Cloud => Arc::new(CloudHandler::new(CloudOptions {
            service_name: config.cloud.service_name.clone(),
            service_version: config.cloud.service_version.clone(),
            level,
            add_source: config.add_source,
            sink,
        })),
    };

    tracing::debug!(
        format = ?config.format,
        level = %level,
        trace_context = config.trace_context,
        "Handler built"
    );

    if config.trace_context {
        Ok(Arc::new(OtelHandler::from_arc(handler)))
    } else {
        Ok(handler)
    }
}

/// [`build_handler`] wrapped in a [`Logger`].
pub fn build_logger(config: &LoggingConfig, sink: Sink) -> Result<Logger, ConfigError> {
    build_handler(config, sink).map(Logger::from_arc)
}

/// Request-scoped middleware deriving from `logger`.
pub fn request_layer(config: &LoggingConfig, logger: Logger) -> RequestLoggerLayer<RequestScoped> {
    RequestScoped::new()
        .base(logger)
        .add_trace(config.http.add_trace)
        .log_request(config.http.log_request)
        .exclude_headers(config.http.exclude_headers.iter().cloned())
        .layer()
}

/// Cloud request middleware; `http.log_request` enables the `httpRequest` group.
pub fn cloud_layer(config: &LoggingConfig, logger: Logger) -> CloudLoggingLayer {
    CloudRequestLogger::from_logger(
        logger,
        CloudMiddlewareOptions {
            gcp_project_id: config.cloud.gcp_project_id.clone(),
            add_trace: config.http.add_trace,
            add_http_request: config.http.log_request,
        },
    )
    .layer()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::loader::parse_config;

    fn output(config: &LoggingConfig, msg: &str) -> String {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let logger = build_logger(config, Sink::shared(buf.clone())).unwrap();
        logger.warn(msg, []);
        let out = buf.lock().unwrap().clone();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_json_format() {
        let config = parse_config("format = \"json\"").unwrap();
        let out = output(&config, "hello");
        assert!(out.contains(r#""msg":"hello""#), "{out}");
    }

    #[test]
    fn test_pretty_format_without_color() {
        let config = parse_config("[pretty]\ncolor = false\noutput_empty_attrs = false").unwrap();
        let out = output(&config, "hello");
        assert!(out.ends_with("WARN: hello\n"), "{out:?}");
    }

    #[test]
    fn test_cloud_format() {
        let config = parse_config("format = \"cloud\"\n[cloud]\nservice_name = \"svc\"").unwrap();
        let out = output(&config, "hello");
        let line: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(line["message"], "hello");
        assert_eq!(line["severity"], "WARNING");
        assert_eq!(line["serviceContext"]["service"], "svc");
    }

    #[test]
    fn test_level_threshold_applies() {
        let config = parse_config("format = \"json\"\nlevel = \"error\"").unwrap();
        assert!(output(&config, "dropped").is_empty());
    }

    #[test]
    fn test_programmatic_bad_encoding_is_setup_error() {
        let mut config = LoggingConfig::default();
        config.pretty.encoding = "xml".into();
        let err = build_handler(&config, Sink::discard()).err().unwrap();
        assert!(matches!(err, ConfigError::Encoding(_)));
    }
}
