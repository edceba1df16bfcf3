//! Proxy route handler.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request,
    },
    response::{IntoResponse, Response},
};

use crate::http::response::{is_json_content_type, relay_as_json};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::authorization::Authorization;
use crate::proxy::encoding::{encode_body, InboundBody};
use crate::proxy::error::ProxyError;
use crate::proxy::path::UpstreamPath;

const ROUTE_LABEL: &str = "proxy";

/// Forward a request to the SmartEvent API and relay the reply.
pub async fn proxy_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let path = UpstreamPath::from_segments(path.split('/'));

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    match forward(&state, &method, &path, request).await {
        Ok(response) => {
            metrics::record_request(
                method.as_str(),
                response.status().as_u16(),
                ROUTE_LABEL,
                start_time,
            );
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Proxy error");
            metrics::record_upstream_error(e.kind());
            let response = e.into_response();
            metrics::record_request(
                method.as_str(),
                response.status().as_u16(),
                ROUTE_LABEL,
                start_time,
            );
            response
        }
    }
}

async fn forward(
    state: &AppState,
    method: &Method,
    path: &UpstreamPath,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let upstream = &state.config.upstream;
    let (parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, state.config.security.max_body_size)
        .await
        .map_err(ProxyError::InboundBody)?;

    let authorization = Authorization::decide(
        parts.headers.get(AUTHORIZATION),
        path,
        &upstream.credential_path_marker,
    );
    let inbound = InboundBody::new(parts.headers, parts.extensions, bytes);
    let body = encode_body(
        method,
        path,
        &upstream.registration_endpoints,
        &upstream.event_code,
        &inbound,
    )
    .await;

    let url = path.target_url(&upstream.base_url);
    tracing::debug!(
        url = %url,
        body = body.kind(),
        authorization = authorization.kind(),
        "Dispatching upstream"
    );

    let mut builder = state.client.request(method.clone(), &url);
    if let Some(value) = authorization.header_value(&upstream.event_code)? {
        builder = builder.header(AUTHORIZATION, value);
    }
    let response = body.apply(builder)?.send().await?;

    let status = response.status();
    if !is_json_content_type(response.headers().get(CONTENT_TYPE)) {
        tracing::warn!(
            url = %url,
            status = %status,
            upstream_content_type = ?response.headers().get(CONTENT_TYPE),
            "Upstream reply is not JSON, relabelling as application/json"
        );
    }
    let text = response.text().await?;

    Ok(relay_as_json(status, text))
}
