//! Logger front end.
//!
//! # Responsibilities
//! - Gate emissions on the handler's level check before building a record
//! - Stamp records with time and call-site source location
//! - Derive loggers carrying extra attributes or an open group
//! - Hold the process-wide default logger
//! - Carry a request-scoped logger through request extensions
//!
//! # Design Decisions
//! - A `Logger` is a cheap handle (`Arc<dyn Handler>`); cloning never copies handler state
//! - Convenience methods never fail; failed emissions are reported via `tracing`
//! - The default logger is swapped atomically and never mutated in place

mod context;

use std::panic::Location;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;
use opentelemetry::Context;

use crate::handler::{Handler, HandlerError, JsonHandler, JsonOptions, Sink};
use crate::record::{Attr, Level, Record, Source};

pub use context::{logger_from, with_logger};

/// Structured logger dispatching records to a [`Handler`].
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
}

impl Logger {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    pub fn from_arc(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// A logger whose records all carry `attrs`.
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Logger {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        if attrs.is_empty() {
            return self.clone();
        }
        Self::from_arc(self.handler.with_attrs(attrs))
    }

    /// A logger that nests subsequent attributes under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Self::from_arc(self.handler.with_group(name))
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(&Context::current(), level)
    }

    #[track_caller]
    pub fn debug(&self, msg: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::DEBUG, msg, attrs);
    }

    #[track_caller]
    pub fn info(&self, msg: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::INFO, msg, attrs);
    }

    #[track_caller]
    pub fn warn(&self, msg: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::WARN, msg, attrs);
    }

    #[track_caller]
    pub fn error(&self, msg: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log(Level::ERROR, msg, attrs);
    }

    /// Emit at `level` using the current execution context.
    #[track_caller]
    pub fn log(&self, level: Level, msg: impl Into<String>, attrs: impl IntoIterator<Item = Attr>) {
        self.log_cx(&Context::current(), level, msg, attrs);
    }

    /// Emit at `level` using `cx` as the execution context.
    #[track_caller]
    pub fn log_cx(
        &self,
        cx: &Context,
        level: Level,
        msg: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) {
        if let Err(err) = self.try_log(cx, level, msg, attrs) {
            tracing::warn!(error = %err, level = %level, "Dropped log record");
        }
    }

    /// Like [`log_cx`](Self::log_cx), returning the handler's failure.
    ///
    /// Records below the handler's level are skipped and return `Ok`.
    #[track_caller]
    pub fn try_log(
        &self,
        cx: &Context,
        level: Level,
        msg: impl Into<String>,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        if !self.handler.enabled(cx, level) {
            return Ok(());
        }
        let mut record = Record::new(level, msg).with_source(Source::from(Location::caller()));
        record.add_attrs(attrs);
        self.handler.handle(cx, record)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

static DEFAULT: OnceLock<ArcSwap<Logger>> = OnceLock::new();

fn default_cell() -> &'static ArcSwap<Logger> {
    DEFAULT.get_or_init(|| {
        ArcSwap::from_pointee(Logger::new(JsonHandler::new(
            Sink::stderr(),
            JsonOptions::default(),
        )))
    })
}

/// The process-wide default logger.
///
/// Until [`set_default`] is called this writes JSON lines to stderr at INFO.
pub fn default_logger() -> Logger {
    (*default_cell().load_full()).clone()
}

/// Replace the process-wide default logger.
pub fn set_default(logger: Logger) {
    default_cell().store(Arc::new(logger));
    tracing::debug!("Default logger replaced");
}
