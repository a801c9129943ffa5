//! Call-stack capture for error attributes.

use std::fmt;

const MAX_DEPTH: usize = 32;

/// Frames from the capture machinery and the formatting pipeline itself.
const INTERNAL_PREFIXES: &[&str] = &[
    "backtrace::",
    "logweave::cloud::",
    "logweave::handler::",
    "logweave::record::",
];

/// Frames from the logger's dispatch path.
const DISPATCH_PREFIX: &str = "logweave::logger::";

/// One resolved stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub file: String,
    pub line: u32,
    pub function: String,
}

/// A captured call stack, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    /// Capture the current thread's stack, skipping this crate's formatting frames.
    pub fn capture() -> Self {
        let mut frames = Vec::new();
        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                let function = symbol
                    .name()
                    .map(|name| format!("{name:#}"))
                    .unwrap_or_default();
                if has_prefix(&function, INTERNAL_PREFIXES) {
                    return;
                }
                frames.push(Frame {
                    file: symbol
                        .filename()
                        .map(|path| path.display().to_string())
                        .unwrap_or_default(),
                    line: symbol.lineno().unwrap_or(0),
                    function,
                });
            });
            frames.len() < MAX_DEPTH
        });
        frames.truncate(MAX_DEPTH);
        Self { frames }
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// `file:line (function)` per frame, without logger dispatch frames.
    pub fn to_lines(&self) -> Vec<String> {
        self.frames
            .iter()
            .filter(|f| !has_prefix(&f.function, &[DISPATCH_PREFIX]))
            .map(|f| format!("{}:{} ({})", f.file, f.line, f.function))
            .collect()
    }
}

/// Prefix match that also sees through trait-impl paths (`<a::B as c::D>::f`).
fn has_prefix(function: &str, prefixes: &[&str]) -> bool {
    let path = function.strip_prefix('<').unwrap_or(function);
    prefixes.iter().any(|p| path.starts_with(p))
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            write!(f, "\nat {}:{}\n   --> {}", frame.file, frame.line, frame.function)?;
        }
        Ok(())
    }
}
