//! SmartEvent gateway library.
//!
//! Backs the abstract-submission site with two API surfaces: a reverse proxy
//! that re-encodes requests for the SmartEvent registration API, and a
//! placeholder payment-verification endpoint.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod proxy;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
