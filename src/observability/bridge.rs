//! `tracing` → [`Handler`] bridge.
//!
//! Lets the formatters of this crate act as the output stage of a `tracing`
//! subscriber. Each event becomes one [`Record`]: the `message` field is the
//! record message and every other field becomes an attribute, in field order.

use std::fmt;
use std::sync::Arc;

use opentelemetry::Context;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer;
use tracing_subscriber::Layer;

use crate::handler::Handler;
use crate::record::{Attr, Level, Record, Source, Value};

const MESSAGE_FIELD: &str = "message";

/// Level of `tracing`'s TRACE, one step below DEBUG.
pub const TRACE: Level = Level(-8);

/// Subscriber layer dispatching events to a [`Handler`].
#[derive(Clone)]
pub struct HandlerLayer {
    handler: Arc<dyn Handler>,
}

impl HandlerLayer {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self { handler }
    }
}

/// Record level of a `tracing` level.
pub fn level_of(level: &tracing::Level) -> Level {
    match *level {
        tracing::Level::TRACE => TRACE,
        tracing::Level::DEBUG => Level::DEBUG,
        tracing::Level::INFO => Level::INFO,
        tracing::Level::WARN => Level::WARN,
        tracing::Level::ERROR => Level::ERROR,
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    attrs: Vec<Attr>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.message = value.to_string();
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::Uint(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == MESSAGE_FIELD {
            self.message = format!("{value:?}");
        } else {
            self.push(field, Value::String(format!("{value:?}")));
        }
    }
}

impl<S: Subscriber> Layer<S> for HandlerLayer {
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: layer::Context<'_, S>) -> bool {
        self.handler
            .enabled(&Context::current(), level_of(metadata.level()))
    }

    fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = Record::new(level_of(metadata.level()), visitor.message);
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            record = record.with_source(Source {
                function: metadata.target().to_string(),
                file: file.to_string(),
                line,
            });
        }
        record.add_attrs(visitor.attrs);

        // Reporting through `tracing` here would re-enter this layer.
        if let Err(err) = self.handler.handle(&Context::current(), record) {
            eprintln!("logweave: failed to handle tracing event: {err}");
        }
    }
}
