//! Request-scoped logging for Cloud Logging output.

use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::{header, Request};

use super::{trace_attrs, CloudHandler};
use crate::http::{request_context, request_id, MakeRequestLogger, RequestLoggerLayer};
use crate::logger::Logger;
use crate::otel::valid_span;
use crate::record::Attr;

pub const REQUEST_ID_KEY: &str = "requestId";

/// Options for [`CloudRequestLogger`].
#[derive(Debug, Clone, Default)]
pub struct CloudMiddlewareOptions {
    /// Project used to build `projects/<id>/traces/<trace>` resource names.
    pub gcp_project_id: String,
    pub add_trace: bool,
    /// Bind an `httpRequest` group describing the request.
    pub add_http_request: bool,
}

/// Binds `requestId`, cloud trace attributes and `httpRequest` per request.
#[derive(Clone, Debug)]
pub struct CloudRequestLogger {
    logger: Logger,
    options: CloudMiddlewareOptions,
}

pub type CloudLoggingLayer = RequestLoggerLayer<CloudRequestLogger>;

impl CloudRequestLogger {
    pub fn new(handler: CloudHandler, options: CloudMiddlewareOptions) -> Self {
        Self::from_logger(Logger::new(handler), options)
    }

    pub fn from_logger(logger: Logger, options: CloudMiddlewareOptions) -> Self {
        Self { logger, options }
    }

    pub fn layer(self) -> CloudLoggingLayer {
        RequestLoggerLayer::new(self)
    }
}

impl MakeRequestLogger for CloudRequestLogger {
    fn make_logger<B>(&self, req: &Request<B>) -> Logger {
        let mut logger = self
            .logger
            .with([Attr::string(REQUEST_ID_KEY, request_id(req))]);

        if self.options.add_trace {
            if let Some(span) = valid_span(&request_context(req)) {
                logger = logger.with(trace_attrs(&self.options.gcp_project_id, &span));
            }
        }

        if self.options.add_http_request {
            logger = logger.with([http_request(req)]);
        }
        logger
    }
}

fn http_request<B>(req: &Request<B>) -> Attr {
    let header_value = |name: header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    Attr::group(
        "httpRequest",
        vec![
            Attr::string("requestMethod", req.method().as_str()),
            Attr::string("requestUrl", req.uri().to_string()),
            Attr::string("protocol", format!("{:?}", req.version())),
            Attr::string("remoteIp", remote_ip),
            Attr::string("userAgent", header_value(header::USER_AGENT)),
            Attr::string("referer", header_value(header::REFERER)),
        ],
    )
}
