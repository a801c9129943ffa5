//! Structured log formatting and enrichment.
//!
//! Handlers that turn log records into pretty terminal lines, JSON lines, or
//! Google Cloud Logging entries; a decorator that injects OpenTelemetry trace
//! context; and HTTP middleware that gives every request its own logger.

// Core model
pub mod handler;
pub mod logger;
pub mod record;

// Formatters and decorators
pub mod cloud;
pub mod otel;
pub mod pretty;

// Integration
pub mod config;
pub mod http;
pub mod observability;

pub use handler::{Handler, HandlerError, JsonHandler, JsonOptions, ReplaceAttr, Sink};
pub use logger::{default_logger, logger_from, set_default, with_logger, Logger};
pub use otel::OtelHandler;
pub use pretty::{AttrEncoding, PrettyHandler};
pub use record::{Attr, Level, Record, Value};
