//! Payment verification stub.
//!
//! Stands in for a real payment gateway while the site is built out: it
//! validates the request shape, waits a simulated processing delay and
//! reports success.

pub mod handlers;
pub mod processor;
pub mod types;

use axum::{routing::post, Router};

use crate::http::server::AppState;
use self::handlers::{method_not_allowed, verify_handler};

pub use types::{PaymentError, VerifiedPayment, VerifyPaymentRequest};

pub const VERIFY_PATH: &str = "/api/payment/verify";

pub fn setup_payment_router() -> Router<AppState> {
    Router::new().route(VERIFY_PATH, post(verify_handler).get(method_not_allowed))
}
