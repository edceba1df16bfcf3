use std::time::{Duration, Instant};

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::payments::processor::{parse_request, verify_payment};

const ROUTE_LABEL: &str = "payment_verify";

pub async fn verify_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let start_time = Instant::now();
    let delay = Duration::from_millis(state.config.payments.simulated_delay_ms);

    let result = match parse_request(&body) {
        Ok(request) => verify_payment(request, delay).await,
        Err(e) => Err(e),
    };

    let response = match result {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Payment verification rejected");
            e.into_response()
        }
    };

    metrics::record_request("POST", response.status().as_u16(), ROUTE_LABEL, start_time);
    response
}

pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "success": false,
            "message": "Method not allowed. Use POST.",
        })),
    )
        .into_response()
}
