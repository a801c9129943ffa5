//! Request-scoped logger middleware.
//!
//! # Responsibilities
//! - Build one logger per request and attach it to the request extensions
//! - Bind the request id and, optionally, the active trace ids
//! - Optionally log one record describing the request
//!
//! # Design Decisions
//! - The logger is derived per request from a shared base; nothing global changes
//! - The inbound `X-Request-ID` header is read, never rewritten
//! - Logger construction is a trait so other output formats can supply their own

use std::task::{Context as TaskContext, Poll};

use axum::http::Request;
use tower::{Layer, Service};
use uuid::Uuid;

use super::request::{request_attributes, X_REQUEST_ID};
use super::request_context;
use crate::logger::{default_logger, with_logger, Logger};
use crate::otel::{valid_span, SPAN_ID_KEY, TRACE_ID_KEY};
use crate::record::{Attr, Level};

pub const REQUEST_ID_KEY: &str = "request.id";

/// Builds the logger for one request.
pub trait MakeRequestLogger: Clone + Send + Sync + 'static {
    fn make_logger<B>(&self, req: &Request<B>) -> Logger;
}

/// Tower layer attaching a request-scoped [`Logger`] to every request.
#[derive(Clone)]
pub struct RequestLoggerLayer<M> {
    make: M,
}

impl<M: MakeRequestLogger> RequestLoggerLayer<M> {
    pub fn new(make: M) -> Self {
        Self { make }
    }
}

impl<S, M: Clone> Layer<S> for RequestLoggerLayer<M> {
    type Service = RequestLoggerService<S, M>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLoggerService {
            inner,
            make: self.make.clone(),
        }
    }
}

/// Service produced by [`RequestLoggerLayer`].
#[derive(Clone)]
pub struct RequestLoggerService<S, M> {
    inner: S,
    make: M,
}

impl<S, M, B> Service<Request<B>> for RequestLoggerService<S, M>
where
    S: Service<Request<B>>,
    M: MakeRequestLogger,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let logger = self.make.make_logger(&req);
        with_logger(req.extensions_mut(), logger);
        self.inner.call(req)
    }
}

/// Request id from the `X-Request-ID` header, or a fresh UUID.
pub(crate) fn request_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// The default request-scoped logger: request id, trace ids, request metadata.
#[derive(Clone, Debug)]
pub struct RequestScoped {
    base: Option<Logger>,
    add_trace: bool,
    log_request: bool,
    exclude_headers: Vec<String>,
}

impl Default for RequestScoped {
    fn default() -> Self {
        Self {
            base: None,
            add_trace: true,
            log_request: false,
            exclude_headers: Vec::new(),
        }
    }
}

impl RequestScoped {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger to derive from. When unset, the default logger at request time is used.
    pub fn base(mut self, logger: Logger) -> Self {
        self.base = Some(logger);
        self
    }

    pub fn add_trace(mut self, enabled: bool) -> Self {
        self.add_trace = enabled;
        self
    }

    /// Log "Processing HTTP request" with the request's metadata.
    pub fn log_request(mut self, enabled: bool) -> Self {
        self.log_request = enabled;
        self
    }

    /// Headers left out of the request record. Matching ignores case.
    pub fn exclude_headers<I, H>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.exclude_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    pub fn layer(self) -> RequestLoggerLayer<Self> {
        RequestLoggerLayer::new(self)
    }
}

impl MakeRequestLogger for RequestScoped {
    fn make_logger<B>(&self, req: &Request<B>) -> Logger {
        let request_id = request_id(req);
        let base = self.base.clone().unwrap_or_else(default_logger);
        let mut logger = base.with([Attr::string(REQUEST_ID_KEY, request_id.as_str())]);

        let cx = request_context(req);
        if self.add_trace {
            if let Some(span) = valid_span(&cx) {
                logger = logger.with([
                    Attr::string(TRACE_ID_KEY, span.trace_id().to_string()),
                    Attr::string(SPAN_ID_KEY, span.span_id().to_string()),
                ]);
            }
        }

        if self.log_request {
            let attrs = request_attributes(req, &self.exclude_headers);
            logger.log_cx(&cx, Level::INFO, "Processing HTTP request", attrs);
        }

        tracing::debug!(
            request_id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
            "Attached request-scoped logger"
        );
        logger
    }
}
