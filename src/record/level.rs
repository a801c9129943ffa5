//! Record severity.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Severity of a log record. Larger values are more severe.
///
/// The named levels are four apart so that custom levels can sit between
/// them; a custom level renders as the nearest lower named level plus an
/// offset (`INFO+2`, `WARN-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Level(pub i32);

impl Level {
    pub const DEBUG: Level = Level(-4);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(4);
    pub const ERROR: Level = Level(8);

    /// The named level this level is rendered relative to.
    fn base(self) -> (&'static str, Level) {
        if self < Level::INFO {
            ("DEBUG", Level::DEBUG)
        } else if self < Level::WARN {
            ("INFO", Level::INFO)
        } else if self < Level::ERROR {
            ("WARN", Level::WARN)
        } else {
            ("ERROR", Level::ERROR)
        }
    }
}

impl From<i32> for Level {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, base) = self.base();
        let offset = self.0 - base.0;
        if offset == 0 {
            f.write_str(name)
        } else {
            write!(f, "{name}{offset:+}")
        }
    }
}

/// Error returned when a level name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown level {0:?}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses `DEBUG`, `info`, `WARN+1`, `error-2` and the like.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLevelError(s.to_string());
        let trimmed = s.trim();
        let split = trimmed.find(['+', '-']).unwrap_or(trimmed.len());
        let (name, offset) = trimmed.split_at(split);

        let base = match name.to_ascii_uppercase().as_str() {
            "DEBUG" => Level::DEBUG,
            "INFO" => Level::INFO,
            "WARN" => Level::WARN,
            "ERROR" => Level::ERROR,
            _ => return Err(err()),
        };
        let offset = if offset.is_empty() {
            0
        } else {
            offset.parse::<i32>().map_err(|_| err())?
        };
        base.0.checked_add(offset).map(Level).ok_or_else(err)
    }
}
