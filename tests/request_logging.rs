//! Request-scoped logging middleware driven through an axum router.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::{routing::get, Router};
use logweave::http::RequestScoped;
use logweave::{Attr, JsonHandler, JsonOptions, Logger, OtelHandler};
use serde_json::Value as Json;
use tower::ServiceExt;

mod common;
use common::{traced_context, Capture, SPAN_ID, TRACE_ID};

async fn handler(logger: Logger) -> &'static str {
    logger.info("in handler", [Attr::string("step", "handler")]);
    "ok"
}

fn app(capture: &Capture, scoped: RequestScoped) -> Router {
    let base = Logger::new(JsonHandler::new(capture.sink(), JsonOptions::default()));
    Router::new()
        .route("/", get(handler))
        .route("/orders", get(handler))
        .layer(scoped.base(base).layer())
}

async fn send(app: Router, request: Request<Body>) {
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn request_line(capture: &Capture) -> Json {
    capture
        .json_lines()
        .into_iter()
        .find(|l| l["msg"] == "Processing HTTP request")
        .expect("request line logged")
}

#[tokio::test]
async fn test_request_id_from_header_reaches_handler() {
    let capture = Capture::new();
    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();

    send(app(&capture, RequestScoped::new()), request).await;

    let lines = capture.json_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["msg"], "in handler");
    assert_eq!(lines[0]["request.id"], "abc-123");
    assert_eq!(lines[0]["step"], "handler");
}

#[tokio::test]
async fn test_request_id_generated_per_request() {
    let capture = Capture::new();
    let router = app(&capture, RequestScoped::new());

    for _ in 0..2 {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        send(router.clone(), request).await;
    }

    let lines = capture.json_lines();
    let first = lines[0]["request.id"].as_str().unwrap();
    let second = lines[1]["request.id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(first).is_ok());
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_x_forwarded_headers() {
    let capture = Capture::new();
    let request = Request::builder()
        .uri("/orders?id=9")
        .header("host", "shop.internal")
        .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();

    send(app(&capture, RequestScoped::new().log_request(true)), request).await;

    let line = request_line(&capture);
    assert_eq!(line["client.address"], "10.0.0.1");
    assert_eq!(line["url.scheme"], "https");
    assert_eq!(line["server.address"], "shop.internal");
    assert_eq!(line["server.port"], 443);
    assert_eq!(line["url.path"], "/orders");
    assert_eq!(line["url.query"], "?id=9");
    assert_eq!(line["http.request.method"], "GET");
    assert_eq!(line["network.protocol.name"], "http");
    assert_eq!(line["network.protocol.version"], "1.1");
}

#[tokio::test]
async fn test_forwarded_header_wins() {
    let capture = Capture::new();
    let request = Request::builder()
        .uri("/")
        .header("forwarded", "for=192.0.2.60;proto=http")
        .header("x-forwarded-for", "10.0.0.1")
        .header("x-forwarded-proto", "https")
        .body(Body::empty())
        .unwrap();

    send(app(&capture, RequestScoped::new().log_request(true)), request).await;

    let line = request_line(&capture);
    assert_eq!(line["client.address"], "192.0.2.60");
    assert_eq!(line["url.scheme"], "http");
    assert_eq!(line["server.port"], 80);
}

#[tokio::test]
async fn test_excluded_headers_not_logged() {
    let capture = Capture::new();
    let request = Request::builder()
        .uri("/")
        .header("authorization", "Bearer secret")
        .header("accept", "application/json")
        .body(Body::empty())
        .unwrap();
    let scoped = RequestScoped::new()
        .log_request(true)
        .exclude_headers(["Authorization"]);

    send(app(&capture, scoped), request).await;

    let line = request_line(&capture);
    assert!(line.get("http.request.header.authorization").is_none());
    assert_eq!(line["http.request.header.accept"], "application/json");
    assert!(!capture.contents().contains("Bearer secret"));
}

#[tokio::test]
async fn test_peer_address_used_as_last_resort() {
    let capture = Capture::new();
    let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let peer: SocketAddr = "203.0.113.7:51000".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));

    send(app(&capture, RequestScoped::new().log_request(true)), request).await;

    let line = request_line(&capture);
    assert_eq!(line["client.address"], "203.0.113.7");
    assert_eq!(line["client.port"], 51000);
    assert_eq!(line["network.peer.address"], "203.0.113.7");
    assert_eq!(line["network.peer.port"], 51000);
}

#[tokio::test]
async fn test_trace_ids_bound_when_enabled() {
    let capture = Capture::new();
    let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
    request.extensions_mut().insert(traced_context());

    send(app(&capture, RequestScoped::new()), request).await;

    let line = &capture.json_lines()[0];
    assert_eq!(line["trace_id"], TRACE_ID);
    assert_eq!(line["span_id"], SPAN_ID);
}

#[tokio::test]
async fn test_trace_ids_omitted_when_disabled() {
    let capture = Capture::new();
    let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
    request.extensions_mut().insert(traced_context());

    send(app(&capture, RequestScoped::new().add_trace(false)), request).await;

    let line = &capture.json_lines()[0];
    assert!(line.get("trace_id").is_none());
}

#[tokio::test]
async fn test_request_line_through_trace_injector() {
    let capture = Capture::new();
    let base = Logger::new(OtelHandler::wrap(JsonHandler::new(
        capture.sink(),
        JsonOptions::default(),
    )));
    let router = Router::new()
        .route("/", get(handler))
        .layer(RequestScoped::new().base(base).log_request(true).layer());
    let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
    request.extensions_mut().insert(traced_context());

    send(router, request).await;

    let line = request_line(&capture);
    assert_eq!(line["otel"]["trace_id"], TRACE_ID);
    assert_eq!(line["trace_id"], TRACE_ID);
}

#[tokio::test]
async fn test_handler_without_middleware_uses_default_logger() {
    let router = Router::new().route("/", get(handler));
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    send(router, request).await;
}
