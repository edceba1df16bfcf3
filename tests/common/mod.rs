//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use smartevent_gateway::config::validation::validate_config;
use smartevent_gateway::config::GatewayConfig;
use smartevent_gateway::http::HttpServer;
use smartevent_gateway::lifecycle::Shutdown;

pub const EVENT_CODE: &str = "EVT-TEST-2025";

/// A request as received by the mock upstream.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Mock upstream that records every request and answers with a fixed reply.
pub struct MockUpstream {
    pub addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<CapturedRequest>,
}

impl MockUpstream {
    pub fn base_url(&self, prefix: &str) -> String {
        format!("http://{}{}", self.addr, prefix)
    }

    pub async fn next_request(&mut self) -> CapturedRequest {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("upstream saw no request")
            .expect("upstream channel closed")
    }

    pub fn received(&mut self) -> usize {
        let mut count = 0;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

/// Start a capturing upstream on an ephemeral port.
pub async fn start_capturing_upstream(
    status: u16,
    content_type: &'static str,
    body: &'static str,
) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let tx = tx.clone();
        async move {
            let (parts, req_body) = request.into_parts();
            let bytes = axum::body::to_bytes(req_body, usize::MAX).await.unwrap();
            let _ = tx.send(CapturedRequest {
                method: parts.method.to_string(),
                path: parts.uri.path().to_string(),
                headers: parts.headers,
                body: bytes,
            });
            (
                StatusCode::from_u16(status).unwrap(),
                [(CONTENT_TYPE, content_type)],
                body,
            )
        }
    });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, rx }
}

/// Gateway config pointed at `base_url` with test-friendly settings.
pub fn test_config(base_url: String) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = base_url;
    config.upstream.event_code = EVENT_CODE.to_string();
    config.payments.simulated_delay_ms = 10;
    config.observability.metrics_enabled = false;
    config.timeouts.connect_secs = 2;
    config.timeouts.upstream_secs = 4;
    config.timeouts.request_secs = 5;
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    validate_config(&config).expect("test config should pass startup validation");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A multipart field as seen by the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Decode a captured multipart body.
pub async fn parse_multipart(captured: &CapturedRequest) -> Vec<ReceivedField> {
    let mut request = Request::new(Body::from(captured.body.clone()));
    *request.headers_mut() = captured.headers.clone();

    let mut multipart = Multipart::from_request(request, &()).await.unwrap();
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap();
        fields.push(ReceivedField {
            name,
            file_name,
            data,
        });
    }
    fields
}
