//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// SmartEvent upstream settings.
    pub upstream: UpstreamConfig,

    /// Payment verification stub settings.
    pub payments: PaymentConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream registration API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every proxied path is appended to.
    pub base_url: String,

    /// Pre-shared event code. Sent as the fallback `Authorization` value and
    /// injected as the `event_code` form field. Normally supplied through
    /// `SMARTEVENT_EVENT_CODE` rather than the config file.
    pub event_code: String,

    /// Paths containing this substring get the event code as credential
    /// when the caller sent no `authorization` header.
    pub credential_path_marker: String,

    /// Substrings identifying the registration endpoints that require
    /// form-encoded bodies.
    pub registration_endpoints: Vec<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.smartevent.ae".to_string(),
            event_code: String::new(),
            credential_path_marker: "Registration-Page-Api".to_string(),
            registration_endpoints: vec![
                "GetCategories".to_string(),
                "GetCategoryFormInputs".to_string(),
                "RegisterDelegate".to_string(),
            ],
        }
    }
}

/// Payment verification stub settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    /// Artificial processing delay before the canned success reply.
    pub simulated_delay_ms: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: 500,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Outbound call timeout (connect, send and read the reply) in seconds.
    /// Must be shorter than `request_secs`.
    pub upstream_secs: u64,

    /// Whole inbound request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 25,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB, abstracts may carry attachments
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [upstream]
            base_url = "http://127.0.0.1:9000/api"
            event_code = "EVT-1"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.upstream.credential_path_marker, "Registration-Page-Api");
        assert_eq!(config.upstream.registration_endpoints.len(), 3);
        assert_eq!(config.payments.simulated_delay_ms, 500);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert!(config.timeouts.upstream_secs < config.timeouts.request_secs);
    }
}
