//! OpenTelemetry trace-context injection.
//!
//! # Responsibilities
//! - Add the active trace and span ids to every record as a top-level `otel` group
//! - Preserve the caller's grouping and bound attributes exactly
//!
//! # Data Flow
//! ```text
//! Record (attrs relative to the innermost open group)
//!     → [otel{trace_id, span_id}] if the context carries a valid span
//!     → root-level bound attributes
//!     → group chain rebuilt innermost-out around the record's attributes
//!     → base handler (never grouped, so the otel group stays at the root)
//! ```
//!
//! # Design Decisions
//! - The wrapped handler is never asked to open a group; grouping is rebuilt
//!   per record from the tracked chain so the trace group cannot be captured
//!   by a caller's group
//! - Attributes bound while a group is open are kept with that group's scope
//! - Records pass through untouched when there is neither a valid trace nor
//!   anything to rebuild

use std::sync::Arc;

use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry::Context;

use crate::handler::{Handler, HandlerError};
use crate::record::{Attr, Level, Record};

/// Key of the injected group.
pub const OTEL_GROUP: &str = "otel";
pub const TRACE_ID_KEY: &str = "trace_id";
pub const SPAN_ID_KEY: &str = "span_id";

/// One group opened through `with_group`, with the attributes bound inside it.
#[derive(Clone)]
struct GroupScope {
    name: String,
    attrs: Vec<Attr>,
}

/// Handler decorator that injects trace context at the root of each record.
#[derive(Clone)]
pub struct OtelHandler {
    handler: Arc<dyn Handler>,
    pre_attrs: Vec<Attr>,
    groups: Vec<GroupScope>,
}

impl OtelHandler {
    pub fn wrap(handler: impl Handler + 'static) -> Self {
        Self::from_arc(Arc::new(handler))
    }

    pub fn from_arc(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            pre_attrs: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Rebuild `record` with trace attributes at the root and the caller's
    /// attributes nested under the open groups.
    fn rebuild(&self, span: Option<&SpanContext>, mut record: Record) -> Record {
        let attrs = record.take_attrs();
        let mut rebuilt = Vec::with_capacity(self.pre_attrs.len() + 2);
        if let Some(span) = span {
            rebuilt.push(span_group(span));
        }
        rebuilt.extend(self.pre_attrs.iter().cloned());

        let mut scopes = self.groups.iter().rev();
        match scopes.next() {
            None => rebuilt.extend(attrs),
            Some(innermost) => {
                let mut content = innermost.attrs.clone();
                content.extend(attrs);
                let mut current = Attr::group(innermost.name.as_str(), content);
                for scope in scopes {
                    let mut outer = scope.attrs.clone();
                    outer.push(current);
                    current = Attr::group(scope.name.as_str(), outer);
                }
                rebuilt.push(current);
            }
        }

        record.add_attrs(rebuilt);
        record
    }
}

/// The `otel` group for a valid span context.
pub fn span_group(span: &SpanContext) -> Attr {
    Attr::group(
        OTEL_GROUP,
        vec![
            Attr::string(TRACE_ID_KEY, span.trace_id().to_string()),
            Attr::string(SPAN_ID_KEY, span.span_id().to_string()),
        ],
    )
}

/// The span context carried by `cx`, if it is valid.
pub fn valid_span(cx: &Context) -> Option<SpanContext> {
    let span = cx.span();
    let span_context = span.span_context();
    span_context.is_valid().then(|| span_context.clone())
}

impl Handler for OtelHandler {
    fn enabled(&self, cx: &Context, level: Level) -> bool {
        self.handler.enabled(cx, level)
    }

    fn handle(&self, cx: &Context, record: Record) -> Result<(), HandlerError> {
        let span = valid_span(cx);
        if span.is_none() && self.pre_attrs.is_empty() && self.groups.is_empty() {
            return self.handler.handle(cx, record);
        }
        let record = self.rebuild(span.as_ref(), record);
        self.handler.handle(cx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        let mut next = self.clone();
        if !attrs.is_empty() {
            match next.groups.last_mut() {
                Some(group) => group.attrs.extend(attrs),
                None => next.pre_attrs.extend(attrs),
            }
        }
        Arc::new(next)
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        let mut next = self.clone();
        if !name.is_empty() {
            next.groups.push(GroupScope {
                name: name.to_string(),
                attrs: Vec::new(),
            });
        }
        Arc::new(next)
    }
}
