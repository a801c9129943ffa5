//! Request-scoped logger carrier.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::Extensions;

use super::{default_logger, Logger};

/// Extension slot holding the logger of the current request.
#[derive(Clone)]
struct RequestLogger(Logger);

/// Attach `logger` to a request's extensions, replacing any previous one.
pub fn with_logger(extensions: &mut Extensions, logger: Logger) {
    extensions.insert(RequestLogger(logger));
}

/// The request's logger, or the default logger when none was attached.
pub fn logger_from(extensions: &Extensions) -> Logger {
    extensions
        .get::<RequestLogger>()
        .map(|RequestLogger(logger)| logger.clone())
        .unwrap_or_else(default_logger)
}

impl<S: Send + Sync> FromRequestParts<S> for Logger {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(logger_from(&parts.extensions))
    }
}
