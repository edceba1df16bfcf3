//! Response relaying.
//!
//! Upstream replies are passed back with their status and body untouched,
//! but always labelled as JSON: the site's client code parses every proxy
//! response as JSON.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Build the client-facing response for an upstream reply.
pub fn relay_as_json(status: StatusCode, body: String) -> Response {
    let content_type = HeaderValue::from_static("application/json");
    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// True when an upstream `Content-Type` already describes JSON.
pub fn is_json_content_type(value: Option<&HeaderValue>) -> bool {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mt| {
            let mt = mt.trim().to_ascii_lowercase();
            mt == "application/json" || mt.ends_with("+json")
        })
        .unwrap_or(false)
}
