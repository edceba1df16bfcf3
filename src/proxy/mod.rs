//! SmartEvent request translator.
//!
//! # Data Flow
//! ```text
//! GET|POST /api/proxy/{*path}
//!     → path.rs (join segments, build upstream URL)
//!     → authorization.rs (caller header | event code | none)
//!     → encoding.rs (multipart | urlencoded | raw | empty)
//!     → reqwest client → SmartEvent API
//!     → http::response (status + raw text, labelled JSON)
//! ```
//!
//! # Design Decisions
//! - Outbound headers are built fresh, never copied from the caller
//! - Each request is independent; no retries, no caching
//! - Any failure before the upstream reply is read becomes a 500 "Proxy error"

pub mod authorization;
pub mod encoding;
pub mod error;
pub mod handler;
pub mod path;

use axum::{routing::get, Router};

use crate::http::server::AppState;

pub use authorization::Authorization;
pub use encoding::{EncodingStrategy, OutboundBody};
pub use error::ProxyError;
pub use path::UpstreamPath;

/// Mount point of the proxy route.
pub const PROXY_PREFIX: &str = "/api/proxy";

pub fn setup_proxy_router() -> Router<AppState> {
    Router::new().route(
        &format!("{PROXY_PREFIX}/{{*path}}"),
        get(handler::proxy_handler).post(handler::proxy_handler),
    )
}
