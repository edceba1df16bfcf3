//! Proxy failure type.

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Anything that stops a request from completing a round trip upstream.
///
/// Upstream 4xx/5xx are not errors; they are relayed as-is.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    InboundBody(#[source] axum::Error),

    #[error("event code is not a valid header value: {0}")]
    Credential(#[from] InvalidHeaderValue),

    #[error(transparent)]
    Upstream(#[from] reqwest::Error),
}

impl ProxyError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InboundBody(_) => "inbound_body",
            Self::Credential(_) => "credential",
            Self::Upstream(e) if e.is_timeout() => "timeout",
            Self::Upstream(e) if e.is_connect() => "connect",
            Self::Upstream(_) => "upstream",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "message": "Proxy error",
            "error": self.to_string(),
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
