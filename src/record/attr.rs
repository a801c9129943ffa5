//! Attributes and attribute values.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::Level;

/// The value half of an [`Attr`].
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Local>),
    Level(Level),
    Error(Arc<dyn StdError + Send + Sync>),
    /// Arbitrary structured data, emitted as-is.
    Json(serde_json::Value),
    /// A nested, ordered sequence of attributes.
    Group(Vec<Attr>),
}

impl Value {
    pub fn is_group(&self) -> bool {
        matches!(self, Value::Group(_))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Level(a), Value::Level(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a.to_string() == b.to_string(),
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Group(a), Value::Group(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Uint(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Duration(d) => write!(f, "{d:?}"),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Level(l) => write!(f, "{l}"),
            Value::Error(e) => write!(f, "{e}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Uint(u) => serializer.serialize_u64(*u),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Nanoseconds, saturating at u64::MAX.
            Value::Duration(d) => {
                serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            }
            Value::Time(_) | Value::Level(_) | Value::Error(_) => {
                serializer.collect_str(self)
            }
            Value::Json(v) => v.serialize(serializer),
            Value::Group(attrs) => Fields(attrs).serialize(serializer),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    String => String,
    &str => String,
    i64 => Int,
    i32 => Int,
    u64 => Uint,
    u32 => Uint,
    u16 => Uint,
    f64 => Float,
    bool => Bool,
    Duration => Duration,
    DateTime<Local> => Time,
    Level => Level,
    serde_json::Value => Json,
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

/// A key/value pair attached to a record.
///
/// Keys are not unique within a level and insertion order is significant.
#[derive(Debug, Clone, PartialEq)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, Value::String(value.into()))
    }

    pub fn int(key: impl Into<String>, value: i64) -> Self {
        Self::new(key, Value::Int(value))
    }

    pub fn bool(key: impl Into<String>, value: bool) -> Self {
        Self::new(key, Value::Bool(value))
    }

    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Self::new(key, Value::Group(attrs))
    }

    pub fn error<E>(key: impl Into<String>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(key, Value::Error(Arc::new(err)))
    }

    /// Captures any serializable value as structured data.
    ///
    /// Values that fail to serialize are recorded as their error message.
    pub fn json<T: Serialize>(key: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|err| serde_json::Value::String(format!("!ERROR: {err}")));
        Self::new(key, Value::Json(value))
    }
}

/// Serializes an attribute slice as a map, preserving order and duplicates.
pub(crate) struct Fields<'a>(pub &'a [Attr]);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.key, &attr.value)?;
        }
        map.end()
    }
}
