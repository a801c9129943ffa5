//! Request metadata extraction.
//!
//! # Responsibilities
//! - Describe an inbound request with OpenTelemetry HTTP server attribute keys
//! - Resolve client and server addresses behind proxies
//!
//! # Design Decisions
//! - Priority for the server host: `Forwarded` host, `X-Forwarded-Host`, `Host`, URI authority
//! - Priority for the scheme: `Forwarded` proto, `X-Forwarded-Proto`, URI scheme, `http`
//! - Priority for the client: `Forwarded` for, `X-Real-IP`, first `X-Forwarded-For`, peer address
//! - Only the first `Forwarded` element (the original client hop) is consulted

use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, Request};

use super::forwarded::parse_forwarded;
use crate::record::Attr;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_REAL_IP: &str = "x-real-ip";

/// Attributes describing `req`, in a fixed order, followed by one
/// `http.request.header.<name>` attribute per header not in `exclude_headers`.
pub fn request_attributes<B>(req: &Request<B>, exclude_headers: &[String]) -> Vec<Attr> {
    let headers = req.headers();
    let forwarded = header_str(headers, header::FORWARDED.as_str())
        .map(parse_forwarded)
        .unwrap_or_default();
    let first = forwarded.first();
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (mut host, mut port) = first
        .and_then(|f| f.host.as_deref())
        .map(split_host_port)
        .unwrap_or_default();
    if host.is_empty() {
        let authority = req.uri().authority().map(|a| a.as_str());
        (host, port) = first_host_port(&[
            header_str(headers, X_FORWARDED_HOST),
            header_str(headers, header::HOST.as_str()),
            authority,
        ]);
    }

    let scheme = first
        .and_then(|f| f.proto.clone())
        .filter(|p| !p.is_empty())
        .or_else(|| header_str(headers, X_FORWARDED_PROTO).map(str::to_string))
        .or_else(|| req.uri().scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    if port.is_none() {
        port = match scheme.as_str() {
            "https" => Some(443),
            "http" => Some(80),
            _ => None,
        };
    }

    let (mut client, mut client_port) = first
        .and_then(|f| f.for_.as_deref())
        .map(split_host_port)
        .unwrap_or_default();
    if client.is_empty() {
        let forwarded_for = header_str(headers, X_FORWARDED_FOR).map(parse_x_forwarded_for);
        let peer = peer.map(|addr| addr.to_string());
        (client, client_port) = first_host_port(&[
            header_str(headers, X_REAL_IP),
            forwarded_for,
            peer.as_deref(),
        ]);
    }

    let version = format!("{:?}", req.version());
    let (protocol, protocol_version) = version
        .split_once('/')
        .map(|(name, v)| (name.to_ascii_lowercase(), v.to_string()))
        .unwrap_or_else(|| ("http".to_string(), version.clone()));

    let size = header_str(headers, header::CONTENT_LENGTH.as_str())
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(-1);

    let mut attrs = vec![Attr::string("server.address", host)];
    if let Some(port) = port {
        attrs.push(Attr::new("server.port", port));
    }
    attrs.extend([
        Attr::string("network.protocol.name", protocol),
        Attr::string("network.protocol.version", protocol_version),
        Attr::string("http.request.method", req.method().as_str()),
        Attr::int("http.request.size", size),
        Attr::string("url.path", req.uri().path()),
        Attr::string("url.scheme", scheme),
        Attr::string(
            "user_agent.original",
            header_str(headers, header::USER_AGENT.as_str()).unwrap_or_default(),
        ),
        Attr::string("client.address", client),
    ]);
    if let Some(port) = client_port {
        attrs.push(Attr::new("client.port", port));
    }
    if let Some(query) = req.uri().query().map(sorted_query).filter(|q| !q.is_empty()) {
        attrs.push(Attr::string("url.query", format!("?{query}")));
    }
    if let Some(peer) = peer {
        attrs.push(Attr::string("network.peer.address", peer.ip().to_string()));
        attrs.push(Attr::new("network.peer.port", peer.port()));
    }

    for name in headers.keys() {
        let name = name.as_str();
        if exclude_headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            continue;
        }
        let joined = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        attrs.push(Attr::string(format!("http.request.header.{name}"), joined));
    }

    attrs
}

/// Trimmed, non-empty header value.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Re-encode a query string with its keys sorted, values kept in order.
fn sorted_query(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Split `host`, `[host]`, `host:port`, `[host]:port` or `:port`.
///
/// Bare IP addresses (including unbracketed IPv6) are returned whole. The
/// host is empty when the input is unparsable; the port is `None` when it
/// is missing or invalid.
pub(crate) fn split_host_port(hostport: &str) -> (String, Option<u16>) {
    let hostport = hostport.trim();
    if !hostport.contains(':') || hostport.parse::<IpAddr>().is_ok() {
        return (hostport.to_string(), None);
    }

    if let Some(rest) = hostport.strip_prefix('[') {
        let Some((host, after)) = rest.split_once(']') else {
            return (String::new(), None);
        };
        return match after.strip_prefix(':') {
            Some(port) => (host.to_string(), port.parse().ok()),
            None if !after.contains(':') => (host.to_string(), None),
            None => (String::new(), None),
        };
    }

    match hostport.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => (String::new(), None),
        Some((host, port)) => (host.to_string(), port.parse().ok()),
        None => (hostport.to_string(), None),
    }
}

/// Host and port from the first source that yields either.
pub(crate) fn first_host_port(sources: &[Option<&str>]) -> (String, Option<u16>) {
    let mut found = (String::new(), None);
    for source in sources.iter().flatten() {
        found = split_host_port(source);
        if !found.0.is_empty() || found.1.is_some_and(|p| p > 0) {
            break;
        }
    }
    found
}

/// First address of an `X-Forwarded-For` list.
pub(crate) fn parse_x_forwarded_for(value: &str) -> &str {
    value.split(',').next().unwrap_or_default().trim()
}
