//! Human-readable console formatter.
//!
//! # Responsibilities
//! - Render one colorized line per record: `[HH:MM:SS.mmm] LEVEL: message {attrs}`
//! - Render the attribute block as indented JSON or as YAML on its own lines
//! - Apply the field-rewrite hook to timestamp, level and message independently
//!
//! # Data Flow
//! ```text
//! Record
//!     → timestamp / level / message rendered directly from the record
//!     → scratch.rs: JsonHandler encodes into the shared buffer (built-ins suppressed)
//!     → decoded into an ordered map
//!     → re-encoded as JSON or YAML
//!     → pieces joined with single spaces, newline-terminated
//!     → Sink
//! ```
//!
//! # Design Decisions
//! - Encoding is delegated to `JsonHandler` so grouping semantics stay identical
//! - The scratch buffer and its lock are shared by the whole derivation family
//! - Omitted pieces leave no stray separators

mod color;
mod scratch;

use std::str::FromStr;
use std::sync::Arc;

use anstyle::Style;

use opentelemetry::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::handler::{chain, Handler, HandlerError, JsonHandler, JsonOptions, ReplaceAttr, Sink};
use crate::record::{Attr, Level, Record, Value, LEVEL_KEY, MESSAGE_KEY, TIME_KEY};
use scratch::Scratch;

const TIME_FORMAT: &str = "[%H:%M:%S%.3f]";

/// Encoding of the attribute block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrEncoding {
    #[default]
    Json,
    Yaml,
}

impl FromStr for AttrEncoding {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(AttrEncoding::Json),
            "yaml" => Ok(AttrEncoding::Yaml),
            _ => Err(HandlerError::UnsupportedEncoding(s.to_string())),
        }
    }
}

struct Config {
    sink: Sink,
    colorize: bool,
    output_empty_attrs: bool,
    encoding: AttrEncoding,
    replace_attr: Option<ReplaceAttr>,
}

/// Builder for [`PrettyHandler`].
#[derive(Clone, Default)]
pub struct PrettyBuilder {
    sink: Sink,
    colorize: bool,
    output_empty_attrs: bool,
    encoding: AttrEncoding,
    level: Level,
    add_source: bool,
    replace_attr: Option<ReplaceAttr>,
}

impl PrettyBuilder {
    /// Destination of rendered lines. The default discards output.
    pub fn sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    pub fn color(mut self, enabled: bool) -> Self {
        self.colorize = enabled;
        self
    }

    /// Render `{}` even when a record has no attributes.
    pub fn output_empty_attrs(mut self, enabled: bool) -> Self {
        self.output_empty_attrs = enabled;
        self
    }

    pub fn encoding(mut self, encoding: AttrEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn add_source(mut self, enabled: bool) -> Self {
        self.add_source = enabled;
        self
    }

    pub fn replace_attr(mut self, hook: ReplaceAttr) -> Self {
        self.replace_attr = Some(hook);
        self
    }

    pub fn build(self) -> PrettyHandler {
        let inner = JsonHandler::new(
            Sink::discard(),
            JsonOptions {
                level: self.level,
                add_source: self.add_source,
                replace_attr: Some(suppress_builtins(self.replace_attr.clone())),
            },
        );
        PrettyHandler {
            inner,
            scratch: Scratch::default(),
            config: Arc::new(Config {
                sink: self.sink,
                colorize: self.colorize,
                output_empty_attrs: self.output_empty_attrs,
                encoding: self.encoding,
                replace_attr: self.replace_attr,
            }),
        }
    }
}

/// Drops the root-level `time`, `level` and `msg` fields, then runs `next`.
///
/// The pretty handler renders those three itself from the record.
fn suppress_builtins(next: Option<ReplaceAttr>) -> ReplaceAttr {
    let drop_builtins: ReplaceAttr = Arc::new(|groups: &[String], attr: Attr| {
        let builtin = matches!(attr.key.as_str(), TIME_KEY | LEVEL_KEY | MESSAGE_KEY);
        (!(groups.is_empty() && builtin)).then_some(attr)
    });
    match next {
        Some(next) => chain(drop_builtins, next),
        None => drop_builtins,
    }
}

/// Colorized, human-readable handler for development.
#[derive(Clone)]
pub struct PrettyHandler {
    inner: JsonHandler,
    scratch: Scratch,
    config: Arc<Config>,
}

impl PrettyHandler {
    pub fn builder() -> PrettyBuilder {
        PrettyBuilder::default()
    }

    /// Stdout, colors, and `{}` for empty attribute blocks.
    pub fn development() -> PrettyHandler {
        Self::builder()
            .sink(Sink::stdout())
            .color(true)
            .output_empty_attrs(true)
            .build()
    }

    fn paint(&self, style: Style, text: String) -> String {
        if self.config.colorize {
            color::paint(style, &text)
        } else {
            text
        }
    }

    /// Run a built-in field through the hook; `None` when it was suppressed.
    fn field(&self, key: &str, value: Value) -> Option<String> {
        let attr = Attr::new(key, value);
        let attr = match &self.config.replace_attr {
            Some(hook) => hook(&[], attr)?,
            None => attr,
        };
        Some(attr.value.to_string()).filter(|s| !s.is_empty())
    }

    fn attr_block(&self, attrs: &Map<String, Json>) -> Result<Option<String>, HandlerError> {
        if attrs.is_empty() && !self.config.output_empty_attrs {
            return Ok(None);
        }
        let block = match self.config.encoding {
            AttrEncoding::Json => {
                serde_json::to_string_pretty(attrs).map_err(HandlerError::EncodeJson)?
            }
            AttrEncoding::Yaml => {
                let yaml = serde_yaml::to_string(attrs).map_err(HandlerError::EncodeYaml)?;
                format!("\n{}", yaml.trim_end_matches('\n'))
            }
        };
        Ok(Some(block))
    }
}

impl Handler for PrettyHandler {
    fn enabled(&self, cx: &Context, level: Level) -> bool {
        self.inner.enabled(cx, level)
    }

    fn handle(&self, _cx: &Context, record: Record) -> Result<(), HandlerError> {
        let timestamp = self
            .field(TIME_KEY, Value::String(record.time.format(TIME_FORMAT).to_string()))
            .map(|t| self.paint(color::LIGHT_GRAY, t));
        let level = self
            .field(LEVEL_KEY, Value::Level(record.level))
            .map(|l| self.paint(color::level_color(record.level), format!("{l}:")));
        let message = self
            .field(MESSAGE_KEY, Value::String(record.message.clone()))
            .map(|m| self.paint(color::WHITE, m));

        let attrs = self.scratch.capture(&self.inner, &record)?;
        let block = self
            .attr_block(&attrs)?
            .map(|b| self.paint(color::DARK_GRAY, b));

        let mut line = [timestamp, level, message, block]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        line.push('\n');

        self.config.sink.write_all(line.as_bytes())?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.bind(attrs),
            ..self.clone()
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.nest(name),
            ..self.clone()
        })
    }
}
