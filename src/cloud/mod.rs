//! Google Cloud Logging structured output.
//!
//! # Responsibilities
//! - Rename built-in fields to the keys the Cloud Logging agent recognizes
//! - Map record levels onto Cloud Logging severities
//! - Expand error attributes into a message plus captured stack
//! - Mark error records for Error Reporting
//! - Attach trace and request metadata through middleware
//!
//! # Design Decisions
//! - Encoding is done by a `JsonHandler` configured with a rewrite hook; this
//!   module only supplies the hook and the error marker
//! - `serviceContext` is bound once at construction so every line carries it

mod levels;
mod middleware;
mod stack;

use std::sync::Arc;

use opentelemetry::trace::SpanContext;
use opentelemetry::Context;
use serde_json::Value as Json;

use crate::handler::{Handler, HandlerError, JsonHandler, JsonOptions, Sink};
use crate::logger::Logger;
use crate::record::{Attr, Level, Record, Value, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY};

pub use levels::{
    lookup_level, parse_level, severity, ALERT, CRITICAL, DEBUG, EMERGENCY, ERROR, INFO, NOTICE,
    WARNING,
};
pub use middleware::{CloudLoggingLayer, CloudMiddlewareOptions, CloudRequestLogger};
pub use stack::{Frame, Stack};

pub const MESSAGE: &str = "message";
pub const SEVERITY: &str = "severity";
pub const SOURCE_LOCATION: &str = "logging.googleapis.com/sourceLocation";
pub const TRACE: &str = "logging.googleapis.com/trace";
pub const SPAN_ID: &str = "logging.googleapis.com/spanId";
pub const TRACE_SAMPLED: &str = "logging.googleapis.com/trace_sampled";

const ERROR_TYPE_KEY: &str = "@type";
const ERROR_TYPE: &str =
    "type.googleapis.com/google.devtools.clouderrorreporting.v1beta1.ReportedErrorEvent";

/// Options for [`CloudHandler`].
#[derive(Debug, Clone)]
pub struct CloudOptions {
    pub service_name: String,
    pub service_version: String,
    pub level: Level,
    pub add_source: bool,
    /// Defaults to stdout, where the Cloud Logging agent collects from.
    pub sink: Sink,
}

impl Default for CloudOptions {
    fn default() -> Self {
        Self {
            service_name: String::new(),
            service_version: String::new(),
            level: INFO,
            add_source: false,
            sink: Sink::stdout(),
        }
    }
}

/// Handler emitting Cloud Logging structured JSON.
#[derive(Clone)]
pub struct CloudHandler {
    inner: JsonHandler,
}

impl CloudHandler {
    pub fn new(options: CloudOptions) -> Self {
        let inner = JsonHandler::new(
            options.sink,
            JsonOptions {
                level: options.level,
                add_source: options.add_source,
                replace_attr: Some(Arc::new(cloud_attrs)),
            },
        )
        .bind(vec![Attr::group(
            "serviceContext",
            vec![
                Attr::string("service", options.service_name),
                Attr::string("version", options.service_version),
            ],
        )]);
        Self { inner }
    }
}

impl Handler for CloudHandler {
    fn enabled(&self, cx: &Context, level: Level) -> bool {
        self.inner.enabled(cx, level)
    }

    fn handle(&self, cx: &Context, mut record: Record) -> Result<(), HandlerError> {
        if record.level >= ERROR {
            record.add_attrs([Attr::string(ERROR_TYPE_KEY, ERROR_TYPE)]);
        }
        self.inner.handle(cx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.bind(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.nest(name),
        })
    }
}

/// Rewrite hook applied to every attribute of a cloud record.
pub fn cloud_attrs(groups: &[String], attr: Attr) -> Option<Attr> {
    let root = groups.is_empty();
    match attr.value {
        Value::Error(err) => Some(Attr::group(
            "error",
            vec![
                Attr::string("message", err.to_string()),
                Attr::new(
                    "stack",
                    Json::Array(
                        Stack::capture()
                            .to_lines()
                            .into_iter()
                            .map(Json::String)
                            .collect(),
                    ),
                ),
            ],
        )),
        Value::Level(level) if root && attr.key == LEVEL_KEY => {
            Some(Attr::string(SEVERITY, severity(level)))
        }
        value if root && attr.key == MESSAGE_KEY => Some(Attr::new(MESSAGE, value)),
        value if root && attr.key == SOURCE_KEY => Some(Attr::new(SOURCE_LOCATION, value)),
        value => Some(Attr { key: attr.key, value }),
    }
}

/// Cloud trace attributes for a span: trace resource name, span id, sampled flag.
pub fn trace_attrs(project_id: &str, span: &SpanContext) -> Vec<Attr> {
    vec![
        Attr::string(
            TRACE,
            format!("projects/{project_id}/traces/{}", span.trace_id()),
        ),
        Attr::string(SPAN_ID, span.span_id().to_string()),
        Attr::bool(TRACE_SAMPLED, span.is_sampled()),
    ]
}

/// `logger` with the cloud trace attributes of `span`, if it is valid.
pub fn with_trace(logger: &Logger, span: &SpanContext, project_id: &str) -> Logger {
    if span.is_valid() {
        logger.with(trace_attrs(project_id, span))
    } else {
        logger.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use opentelemetry::trace::{SpanId, TraceFlags, TraceId, TraceState};

    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_builtin_keys_renamed_at_root_only() {
        let renamed = cloud_attrs(&[], Attr::string(MESSAGE_KEY, "hi")).unwrap();
        assert_eq!(renamed.key, MESSAGE);
        let nested = cloud_attrs(&["g".into()], Attr::string(MESSAGE_KEY, "hi")).unwrap();
        assert_eq!(nested.key, MESSAGE_KEY);
    }

    #[test]
    fn test_level_becomes_severity() {
        let attr = cloud_attrs(&[], Attr::new(LEVEL_KEY, Value::Level(Level::WARN))).unwrap();
        assert_eq!(attr, Attr::string(SEVERITY, "WARNING"));
    }

    #[test]
    fn test_error_expands_to_message_and_stack() {
        let attr = cloud_attrs(&[], Attr::error("err", Boom)).unwrap();
        assert_eq!(attr.key, "error");
        let Value::Group(members) = attr.value else {
            panic!("expected group");
        };
        assert_eq!(members[0], Attr::string("message", "boom"));
        assert_eq!(members[1].key, "stack");
        assert!(matches!(members[1].value, Value::Json(Json::Array(_))));
    }

    #[test]
    fn test_error_records_get_type_marker() {
        let buf = Arc::new(std::sync::Mutex::new(Vec::<u8>::new()));
        let handler = CloudHandler::new(CloudOptions {
            service_name: "svc".into(),
            service_version: "1.0".into(),
            sink: Sink::shared(buf.clone()),
            ..Default::default()
        });
        let cx = Context::new();
        handler.handle(&cx, Record::new(Level::INFO, "fine")).unwrap();
        handler.handle(&cx, Record::new(Level::ERROR, "bad")).unwrap();

        let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        let lines: Vec<Json> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["message"], "fine");
        assert_eq!(lines[0]["severity"], "INFO");
        assert_eq!(lines[0]["serviceContext"]["service"], "svc");
        assert!(lines[0].get(ERROR_TYPE_KEY).is_none());
        assert_eq!(lines[1][ERROR_TYPE_KEY], ERROR_TYPE);
    }

    #[test]
    fn test_trace_attrs_use_project_resource_name() {
        let span = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let attrs = trace_attrs("my-project", &span);
        assert_eq!(
            attrs[0],
            Attr::string(TRACE, "projects/my-project/traces/4bf92f3577b34da6a3ce929d0e0e4736")
        );
        assert_eq!(attrs[1], Attr::string(SPAN_ID, "00f067aa0ba902b7"));
        assert_eq!(attrs[2], Attr::bool(TRACE_SAMPLED, true));
    }

    #[test]
    fn test_sink_write_error_surfaces() {
        struct Broken;
        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let handler = CloudHandler::new(CloudOptions {
            sink: Sink::new(Broken),
            ..Default::default()
        });
        let err = handler
            .handle(&Context::new(), Record::new(Level::INFO, "m"))
            .unwrap_err();
        assert!(matches!(err, HandlerError::Write(_)));
    }
}
