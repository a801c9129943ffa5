//! Attribute tree model shared by every handler.
//!
//! # Responsibilities
//! - Represent one log emission as an immutable [`Record`]
//! - Represent attributes as an ordered, nested key/value tree
//! - Define the well-known keys of the built-in record fields
//!
//! # Design Decisions
//! - Attribute order is insertion order and is preserved through encoding
//! - Duplicate keys are allowed; the JSON and cloud encoders emit them as-is
//! - A record is consumed by exactly one `Handler::handle` call

mod attr;
mod level;

use std::panic::Location;

use chrono::{DateTime, Local};
use serde::Serialize;

pub use attr::{Attr, Value};
pub(crate) use attr::Fields;
pub use level::{Level, ParseLevelError};

/// Key of the record timestamp.
pub const TIME_KEY: &str = "time";
/// Key of the record level.
pub const LEVEL_KEY: &str = "level";
/// Key of the record message.
pub const MESSAGE_KEY: &str = "msg";
/// Key of the record source location.
pub const SOURCE_KEY: &str = "source";

/// Source location of the call that produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl From<&Location<'_>> for Source {
    fn from(location: &Location<'_>) -> Self {
        Self {
            function: String::new(),
            file: location.file().to_string(),
            line: location.line(),
        }
    }
}

/// A single log emission.
#[derive(Debug, Clone)]
pub struct Record {
    pub time: DateTime<Local>,
    pub level: Level,
    pub message: String,
    pub source: Option<Source>,
    attrs: Vec<Attr>,
}

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    pub fn with_time(mut self, time: DateTime<Local>) -> Self {
        self.time = time;
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }

    /// Remove and return the attributes, leaving the other fields intact.
    pub fn take_attrs(&mut self) -> Vec<Attr> {
        std::mem::take(&mut self.attrs)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_with_time_overrides_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let record = Record::new(Level::INFO, "m").with_time(at);
        assert_eq!(record.time, at);
    }

    #[test]
    fn test_take_attrs_leaves_fields() {
        let mut record = Record::new(Level::WARN, "m");
        record.add_attrs([Attr::int("a", 1), Attr::int("a", 2)]);
        assert_eq!(record.num_attrs(), 2);

        let taken = record.take_attrs();
        assert_eq!(taken, vec![Attr::int("a", 1), Attr::int("a", 2)]);
        assert_eq!(record.num_attrs(), 0);
        assert_eq!(record.message, "m");
        assert_eq!(record.level, Level::WARN);
    }
}
