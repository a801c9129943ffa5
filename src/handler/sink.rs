//! Output destinations.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// A byte destination shared by a handler and everything derived from it.
///
/// A sink with no writer discards output.
#[derive(Clone, Default)]
pub struct Sink {
    writer: Option<Arc<Mutex<dyn Write + Send>>>,
}

impl Sink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self::shared(Arc::new(Mutex::new(writer)))
    }

    /// Wrap a writer the caller keeps a handle to.
    pub fn shared<W: Write + Send + 'static>(writer: Arc<Mutex<W>>) -> Self {
        let writer: Arc<Mutex<dyn Write + Send>> = writer;
        Self {
            writer: Some(writer),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    pub fn discard() -> Self {
        Self { writer: None }
    }

    pub fn is_discard(&self) -> bool {
        self.writer.is_none()
    }

    /// Write one complete chunk of output.
    pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let Some(writer) = &self.writer else {
            return Ok(());
        };
        let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(bytes)?;
        writer.flush()
    }
}

impl<W: Write + Send + 'static> From<Option<W>> for Sink {
    fn from(writer: Option<W>) -> Self {
        writer.map(Sink::new).unwrap_or_default()
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("discard", &self.is_discard())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_accepts_writes() {
        let sink = Sink::discard();
        assert!(sink.is_discard());
        assert!(sink.write_all(b"dropped\n").is_ok());
    }

    #[test]
    fn test_none_writer_discards() {
        let sink = Sink::from(None::<Vec<u8>>);
        assert!(sink.is_discard());
    }

    #[test]
    fn test_shared_writer_receives_bytes() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Sink::shared(buf.clone());
        sink.write_all(b"one\n").unwrap();
        sink.clone().write_all(b"two\n").unwrap();
        assert_eq!(&*buf.lock().unwrap(), b"one\ntwo\n");
    }
}
