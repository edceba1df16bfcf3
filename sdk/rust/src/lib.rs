//! Rust client for the SmartEvent gateway.

pub mod client;

pub use client::{GatewayClient, PaymentVerification, VerifyRequest};
