//! Payment verification types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Body of `POST /api/payment/verify`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// Canned success reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub success: bool,
    pub status: String,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// RFC 3339, UTC, millisecond precision.
    pub verified_at: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Missing required field: order_id")]
    MissingOrderId,

    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        match self {
            PaymentError::MissingOrderId => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": self.to_string(),
                })),
            )
                .into_response(),
            PaymentError::Malformed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "status": "failed",
                    "message": "Failed to verify payment",
                    "error": self.to_string(),
                })),
            )
                .into_response(),
        }
    }
}
