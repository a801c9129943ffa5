//! Line-delimited JSON encoder.
//!
//! # Responsibilities
//! - Encode one record as one JSON object followed by a newline
//! - Nest bound attributes and record attributes under the open groups
//! - Apply the configured `ReplaceAttr` hook to every non-group attribute
//!
//! # Design Decisions
//! - Built-in fields come first: `time`, `level`, `msg`, then `source`
//! - Groups that end up empty are omitted; groups with an empty key are inlined
//! - `encode` writes into a caller-owned buffer so wrappers can capture output

use std::sync::Arc;

use opentelemetry::Context;

use super::{Handler, HandlerError, ReplaceAttr, Sink};
use crate::record::{
    Attr, Fields, Level, Record, Value, LEVEL_KEY, MESSAGE_KEY, SOURCE_KEY, TIME_KEY,
};

/// Options for [`JsonHandler`].
#[derive(Clone, Default)]
pub struct JsonOptions {
    /// Minimum level handled.
    pub level: Level,
    /// Emit the `source` field when the record carries one.
    pub add_source: bool,
    pub replace_attr: Option<ReplaceAttr>,
}

/// Attributes bound at one nesting depth. The root scope has an empty name.
#[derive(Clone, Default)]
struct Scope {
    name: String,
    attrs: Vec<Attr>,
}

/// Handler that writes each record as a JSON object on its own line.
#[derive(Clone)]
pub struct JsonHandler {
    options: Arc<JsonOptions>,
    sink: Sink,
    scopes: Arc<Vec<Scope>>,
}

impl JsonHandler {
    pub fn new(sink: Sink, options: JsonOptions) -> Self {
        Self {
            options: Arc::new(options),
            sink,
            scopes: Arc::new(vec![Scope::default()]),
        }
    }

    /// Derive a handler with `attrs` bound at the current group depth.
    pub fn bind(&self, attrs: Vec<Attr>) -> Self {
        if attrs.is_empty() {
            return self.clone();
        }
        let mut scopes = (*self.scopes).clone();
        if let Some(current) = scopes.last_mut() {
            current.attrs.extend(attrs);
        }
        Self {
            scopes: Arc::new(scopes),
            ..self.clone()
        }
    }

    /// Derive a handler that nests later attributes under `name`.
    pub fn nest(&self, name: &str) -> Self {
        if name.is_empty() {
            return self.clone();
        }
        let mut scopes = (*self.scopes).clone();
        scopes.push(Scope {
            name: name.to_string(),
            attrs: Vec::new(),
        });
        Self {
            scopes: Arc::new(scopes),
            ..self.clone()
        }
    }

    pub fn level(&self) -> Level {
        self.options.level
    }

    /// Append the encoded record, newline-terminated, to `buf`.
    pub fn encode(&self, record: &Record, buf: &mut Vec<u8>) -> Result<(), HandlerError> {
        let hook = self.options.replace_attr.as_ref();
        let mut fields = Vec::new();

        let mut builtins = vec![
            Attr::new(TIME_KEY, Value::Time(record.time)),
            Attr::new(LEVEL_KEY, Value::Level(record.level)),
            Attr::string(MESSAGE_KEY, record.message.as_str()),
        ];
        if self.options.add_source {
            if let Some(source) = &record.source {
                builtins.push(Attr::json(SOURCE_KEY, source));
            }
        }
        resolve(builtins, &mut Vec::new(), hook, &mut fields);
        resolve(self.tree(record), &mut Vec::new(), hook, &mut fields);

        serde_json::to_writer(&mut *buf, &Fields(&fields)).map_err(HandlerError::EncodeJson)?;
        buf.push(b'\n');
        Ok(())
    }

    /// Bound attributes and the record's attributes, nested under the open groups.
    fn tree(&self, record: &Record) -> Vec<Attr> {
        let mut scopes = self.scopes.iter().rev();
        let Some(innermost) = scopes.next() else {
            return record.attrs().to_vec();
        };

        let mut content = innermost.attrs.clone();
        content.extend(record.attrs().iter().cloned());
        let mut name = innermost.name.clone();
        for scope in scopes {
            let mut outer = scope.attrs.clone();
            outer.push(Attr::group(name, content));
            content = outer;
            name = scope.name.clone();
        }
        content
    }
}

/// Apply the hook, drop empty groups and inline unnamed ones.
fn resolve(
    attrs: Vec<Attr>,
    path: &mut Vec<String>,
    hook: Option<&ReplaceAttr>,
    out: &mut Vec<Attr>,
) {
    for attr in attrs {
        match attr.value {
            Value::Group(members) if attr.key.is_empty() => resolve(members, path, hook, out),
            Value::Group(members) => {
                path.push(attr.key);
                let mut children = Vec::new();
                resolve(members, path, hook, &mut children);
                let key = path.pop().unwrap_or_default();
                if !children.is_empty() {
                    out.push(Attr::group(key, children));
                }
            }
            value => {
                let attr = Attr { key: attr.key, value };
                let replaced = match hook {
                    Some(hook) => hook(path, attr),
                    None => Some(attr),
                };
                match replaced {
                    // Groups produced by the hook are not fed back through it.
                    Some(attr) if attr.value.is_group() => resolve(vec![attr], path, None, out),
                    Some(attr) => out.push(attr),
                    None => {}
                }
            }
        }
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, _cx: &Context, level: Level) -> bool {
        level >= self.options.level
    }

    fn handle(&self, _cx: &Context, record: Record) -> Result<(), HandlerError> {
        let mut buf = Vec::with_capacity(256);
        self.encode(&record, &mut buf)?;
        self.sink.write_all(&buf)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(self.bind(attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(self.nest(name))
    }
}
