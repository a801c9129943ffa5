//! Record handling subsystem.
//!
//! # Data Flow
//! ```text
//! Logger::info(...)
//!     → Handler::enabled (level gate)
//!     → Handler::handle (one Record, consumed)
//!         → decorators (otel, cloud, pretty) transform the record
//!         → json.rs encodes bytes
//!         → sink.rs writes one line
//! ```
//!
//! # Design Decisions
//! - Handlers are immutable values; `with_attrs`/`with_group` return new handlers
//! - Decorators wrap another handler instead of reimplementing encoding
//! - Field rewriting is a pure function value (`ReplaceAttr`), composed by chaining

mod error;
pub mod json;
mod sink;

use std::sync::Arc;

use opentelemetry::Context;

use crate::record::{Attr, Level, Record};

pub use error::HandlerError;
pub use json::{JsonHandler, JsonOptions};
pub use sink::Sink;

/// Formats and emits records.
///
/// `cx` is the caller's execution context; it carries the active trace, if any.
pub trait Handler: Send + Sync {
    /// Whether records at `level` would be handled.
    fn enabled(&self, cx: &Context, level: Level) -> bool;

    /// Handle a single record.
    fn handle(&self, cx: &Context, record: Record) -> Result<(), HandlerError>;

    /// A handler whose output includes `attrs` in every record.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler that nests all subsequent attributes under `name`.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

impl Handler for Arc<dyn Handler> {
    fn enabled(&self, cx: &Context, level: Level) -> bool {
        (**self).enabled(cx, level)
    }

    fn handle(&self, cx: &Context, record: Record) -> Result<(), HandlerError> {
        (**self).handle(cx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        (**self).with_attrs(attrs)
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        (**self).with_group(name)
    }
}

/// Rewrites an attribute before it is encoded.
///
/// Receives the enclosing group names (outermost first) and the attribute;
/// returning `None` drops the attribute. Group attributes themselves are not
/// passed to the hook, only their members.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Option<Attr> + Send + Sync>;

/// Apply `first`, then `then` to whatever `first` kept.
pub fn chain(first: ReplaceAttr, then: ReplaceAttr) -> ReplaceAttr {
    Arc::new(move |groups: &[String], attr: Attr| {
        first(groups, attr).and_then(|a| then(groups, a))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_applies_in_order_and_stops_on_drop() {
        let rename: ReplaceAttr = Arc::new(|_: &[String], mut attr: Attr| {
            if attr.key == "a" {
                attr.key = "b".into();
            }
            Some(attr)
        });
        let drop_b: ReplaceAttr =
            Arc::new(|_: &[String], attr: Attr| (attr.key != "b").then_some(attr));

        let hook = chain(rename, drop_b);
        assert!(hook(&[], Attr::int("a", 1)).is_none());
        assert_eq!(hook(&[], Attr::int("c", 1)), Some(Attr::int("c", 1)));
    }
}
