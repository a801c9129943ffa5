//! Level color bands.

use anstyle::{AnsiColor, Color, Style};

use crate::record::Level;

const fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

pub(crate) const CYAN: Style = fg(AnsiColor::Cyan);
pub(crate) const LIGHT_GRAY: Style = fg(AnsiColor::White);
pub(crate) const DARK_GRAY: Style = fg(AnsiColor::BrightBlack);
pub(crate) const LIGHT_RED: Style = fg(AnsiColor::BrightRed);
pub(crate) const LIGHT_YELLOW: Style = fg(AnsiColor::BrightYellow);
pub(crate) const LIGHT_BLUE: Style = fg(AnsiColor::BrightBlue);
pub(crate) const LIGHT_MAGENTA: Style = fg(AnsiColor::BrightMagenta);
pub(crate) const WHITE: Style = fg(AnsiColor::BrightWhite);

/// `text` wrapped in `style` and a reset.
///
/// Always emits escape codes; whether to color is the caller's decision.
pub(crate) fn paint(style: Style, text: &str) -> String {
    format!("{style}{text}{style:#}")
}

/// Color band for a level. Bands are thresholds, so custom levels take the
/// color of the nearest named level at or below them.
pub(crate) fn level_color(level: Level) -> Style {
    if level <= Level::DEBUG {
        LIGHT_GRAY
    } else if level <= Level::INFO {
        CYAN
    } else if level < Level::WARN {
        LIGHT_BLUE
    } else if level < Level::ERROR {
        LIGHT_YELLOW
    } else if level == Level::ERROR {
        LIGHT_RED
    } else {
        LIGHT_MAGENTA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_in_escape_codes() {
        assert_eq!(paint(CYAN, "INFO:"), "\x1b[36mINFO:\x1b[0m");
        assert_eq!(paint(LIGHT_GRAY, "t"), "\x1b[37mt\x1b[0m");
        assert_eq!(paint(DARK_GRAY, "{}"), "\x1b[90m{}\x1b[0m");
        assert_eq!(paint(LIGHT_RED, "ERROR:"), "\x1b[91mERROR:\x1b[0m");
        assert_eq!(paint(LIGHT_YELLOW, "WARN:"), "\x1b[93mWARN:\x1b[0m");
        assert_eq!(paint(LIGHT_BLUE, "INFO+2:"), "\x1b[94mINFO+2:\x1b[0m");
        assert_eq!(paint(LIGHT_MAGENTA, "ERROR+4:"), "\x1b[95mERROR+4:\x1b[0m");
        assert_eq!(paint(WHITE, "msg"), "\x1b[97mmsg\x1b[0m");
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(level_color(Level(-8)), LIGHT_GRAY);
        assert_eq!(level_color(Level::DEBUG), LIGHT_GRAY);
        assert_eq!(level_color(Level(-2)), CYAN);
        assert_eq!(level_color(Level::INFO), CYAN);
        assert_eq!(level_color(Level(2)), LIGHT_BLUE);
        assert_eq!(level_color(Level::WARN), LIGHT_YELLOW);
        assert_eq!(level_color(Level(7)), LIGHT_YELLOW);
        assert_eq!(level_color(Level::ERROR), LIGHT_RED);
        assert_eq!(level_color(Level(9)), LIGHT_MAGENTA);
    }
}
