//! Cloud Logging severities.
//!
//! The four record levels map onto the provider's severity scale; the
//! remaining severities sit at the custom levels in between.

use crate::record::Level;

pub const DEBUG: Level = Level::DEBUG;
pub const INFO: Level = Level::INFO;
pub const NOTICE: Level = Level(2);
pub const WARNING: Level = Level::WARN;
pub const ERROR: Level = Level::ERROR;
pub const CRITICAL: Level = Level(10);
pub const ALERT: Level = Level(12);
pub const EMERGENCY: Level = Level(14);

/// Severity string for `level`.
///
/// Named severities match exactly; anything else falls back to the record
/// level's own rendering (`INFO+1`).
pub fn severity(level: Level) -> String {
    let name = match level {
        DEBUG => "DEBUG",
        INFO => "INFO",
        NOTICE => "NOTICE",
        WARNING => "WARNING",
        ERROR => "ERROR",
        CRITICAL => "CRITICAL",
        ALERT => "ALERT",
        EMERGENCY => "EMERGENCY",
        other => return other.to_string(),
    };
    name.to_string()
}

/// Level for a severity name or integer; `None` if `value` is neither.
pub fn lookup_level(value: &str) -> Option<Level> {
    let value = value.trim();
    let level = match value.to_ascii_lowercase().as_str() {
        "debug" => DEBUG,
        "info" => INFO,
        "notice" => NOTICE,
        "warn" | "warning" => WARNING,
        "error" => ERROR,
        "critical" => CRITICAL,
        "alert" => ALERT,
        "emergency" => EMERGENCY,
        _ => return value.parse::<i32>().ok().map(Level),
    };
    Some(level)
}

/// Like [`lookup_level`], defaulting to [`INFO`].
pub fn parse_level(value: &str) -> Level {
    lookup_level(value).unwrap_or(INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_names() {
        assert_eq!(severity(WARNING), "WARNING");
        assert_eq!(severity(NOTICE), "NOTICE");
        assert_eq!(severity(EMERGENCY), "EMERGENCY");
        assert_eq!(severity(Level(1)), "INFO+1");
        assert_eq!(severity(Level(16)), "ERROR+8");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(" Critical "), CRITICAL);
        assert_eq!(parse_level("warning"), WARNING);
        assert_eq!(parse_level("6"), Level(6));
        assert_eq!(parse_level("-8"), Level(-8));
        assert_eq!(parse_level(""), INFO);
        assert_eq!(parse_level("loud"), INFO);
        assert_eq!(lookup_level("loud"), None);
    }
}
