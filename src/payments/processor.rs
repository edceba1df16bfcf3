use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::payments::types::{PaymentError, VerifiedPayment, VerifyPaymentRequest};

/// Parse a raw verification request body.
pub fn parse_request(body: &[u8]) -> Result<VerifyPaymentRequest, PaymentError> {
    Ok(serde_json::from_slice(body)?)
}

/// Verify a payment.
///
/// Placeholder: no gateway is contacted. After `delay` every request with an
/// order id is reported as verified.
pub async fn verify_payment(
    request: VerifyPaymentRequest,
    delay: Duration,
) -> Result<VerifiedPayment, PaymentError> {
    let order_id = request
        .order_id
        .filter(|id| !id.is_empty())
        .ok_or(PaymentError::MissingOrderId)?;

    tokio::time::sleep(delay).await;

    info!(
        order_id = %order_id,
        transaction_id = ?request.transaction_id,
        "Payment verified (simulated)"
    );

    Ok(VerifiedPayment {
        success: true,
        status: "verified".to_string(),
        order_id,
        transaction_id: request.transaction_id,
        verified_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        message: "Payment verified successfully".to_string(),
    })
}
