//! HTTP request logging subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware.rs (request id, trace ids, optional request record)
//!         → request.rs (semantic attributes, proxy-aware address resolution)
//!             → forwarded.rs (RFC 7239 parsing)
//!     → logger attached to request extensions
//!     → handler extracts `Logger` (falls back to the default logger)
//! ```

mod forwarded;
mod middleware;
mod request;

use axum::http::Request;
use opentelemetry::Context;

pub use forwarded::{parse_forwarded, ForwardedElement};
pub use middleware::{
    MakeRequestLogger, RequestLoggerLayer, RequestLoggerService, RequestScoped, REQUEST_ID_KEY,
};
pub(crate) use middleware::request_id;
pub use request::{
    request_attributes, X_FORWARDED_FOR, X_FORWARDED_HOST, X_FORWARDED_PROTO, X_REAL_IP,
    X_REQUEST_ID,
};

/// Execution context of a request.
///
/// An `opentelemetry::Context` placed in the request extensions by an earlier
/// layer wins; otherwise the ambient context is used.
pub fn request_context<B>(req: &Request<B>) -> Context {
    req.extensions()
        .get::<Context>()
        .cloned()
        .unwrap_or_else(Context::current)
}
