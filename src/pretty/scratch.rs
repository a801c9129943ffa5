//! Inner encoder capture.
//!
//! The pretty handler renders attributes by letting a [`JsonHandler`] encode
//! the record into a scratch buffer and decoding that buffer back into an
//! ordered map. One buffer and its lock are owned jointly by a pretty handler
//! and every handler derived from it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::handler::{HandlerError, JsonHandler};
use crate::record::Record;

#[derive(Clone, Default)]
pub(crate) struct Scratch(Arc<Mutex<Vec<u8>>>);

/// Clears the buffer before the lock is released, on every exit path.
struct Reset<'a>(MutexGuard<'a, Vec<u8>>);

impl Drop for Reset<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

impl Scratch {
    /// Encode `record` with `inner` and decode the result.
    pub(crate) fn capture(
        &self,
        inner: &JsonHandler,
        record: &Record,
    ) -> Result<Map<String, Value>, HandlerError> {
        let mut buf = Reset(self.0.lock().unwrap_or_else(PoisonError::into_inner));
        inner
            .encode(record, &mut buf.0)
            .map_err(|err| HandlerError::InnerEncode(Box::new(err)))?;
        serde_json::from_slice(&buf.0).map_err(HandlerError::Decode)
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.0.lock().map(|buf| buf.is_empty()).unwrap_or(false)
    }

    #[cfg(test)]
    fn preload(&self, bytes: &[u8]) {
        self.0.lock().unwrap().extend_from_slice(bytes);
    }
}
