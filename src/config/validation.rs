//! Configuration validation.
//!
//! Semantic checks only; serde already handled the syntax. Every violation
//! is collected so an operator sees the whole list at once.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("upstream.base_url `{0}` is not an http(s) URL")]
    BaseUrl(String),

    #[error("upstream.event_code is empty (set SMARTEVENT_EVENT_CODE)")]
    MissingEventCode,

    #[error("upstream.event_code contains characters not allowed in a header")]
    EventCodeNotHeaderSafe,

    #[error("upstream.credential_path_marker is empty")]
    EmptyCredentialMarker,

    #[error("upstream.registration_endpoints is empty or contains an empty entry")]
    RegistrationEndpoints,

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.upstream_secs ({upstream_secs}) must be shorter than timeouts.request_secs ({request_secs})")]
    UpstreamTimeoutNotShorter { upstream_secs: u64, request_secs: u64 },

    #[error("payments.simulated_delay_ms ({delay_ms}) must be shorter than timeouts.request_secs ({request_secs}s)")]
    DelayExceedsRequestTimeout { delay_ms: u64, request_secs: u64 },

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a configuration, returning all problems found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::BaseUrl(upstream.base_url.clone())),
    }

    if upstream.event_code.is_empty() {
        errors.push(ValidationError::MissingEventCode);
    } else if HeaderValue::from_str(&upstream.event_code).is_err() {
        errors.push(ValidationError::EventCodeNotHeaderSafe);
    }

    if upstream.credential_path_marker.is_empty() {
        errors.push(ValidationError::EmptyCredentialMarker);
    }

    if upstream.registration_endpoints.is_empty()
        || upstream.registration_endpoints.iter().any(|m| m.is_empty())
    {
        errors.push(ValidationError::RegistrationEndpoints);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    let timeouts = &config.timeouts;
    if timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream_secs"));
    }
    if timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    } else {
        // The whole-request timer answers with a bare 408, so the handlers'
        // own deadlines must expire first.
        if timeouts.upstream_secs >= timeouts.request_secs {
            errors.push(ValidationError::UpstreamTimeoutNotShorter {
                upstream_secs: timeouts.upstream_secs,
                request_secs: timeouts.request_secs,
            });
        }
        let delay_ms = config.payments.simulated_delay_ms;
        if u128::from(delay_ms) >= u128::from(timeouts.request_secs) * 1000 {
            errors.push(ValidationError::DelayExceedsRequestTimeout {
                delay_ms,
                request_secs: timeouts.request_secs,
            });
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.event_code = "EVT-2025".into();
        config
    }

    #[test]
    fn test_default_with_event_code_is_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_event_code_rejected() {
        let config = GatewayConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingEventCode]);
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = valid();
        config.upstream.base_url = "ftp://example.com".into();
        config.upstream.registration_endpoints = vec!["GetCategories".into(), String::new()];
        config.timeouts.request_secs = 0;
        config.listener.bind_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::BaseUrl("ftp://example.com".into())));
        assert!(errors.contains(&ValidationError::RegistrationEndpoints));
        assert!(errors.contains(&ValidationError::ZeroTimeout("request_secs")));
        assert!(errors.contains(&ValidationError::BindAddress("nowhere".into())));
    }

    #[test]
    fn test_upstream_timeout_must_be_shorter_than_request() {
        let mut config = valid();
        config.timeouts.upstream_secs = 30;
        config.timeouts.request_secs = 30;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UpstreamTimeoutNotShorter {
                upstream_secs: 30,
                request_secs: 30,
            }]
        );
    }

    #[test]
    fn test_simulated_delay_must_fit_request_timeout() {
        let mut config = valid();
        config.timeouts.upstream_secs = 1;
        config.timeouts.request_secs = 2;
        config.payments.simulated_delay_ms = 2000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DelayExceedsRequestTimeout {
                delay_ms: 2000,
                request_secs: 2,
            }]
        );

        config.payments.simulated_delay_ms = 1999;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_event_code_must_be_header_safe() {
        let mut config = valid();
        config.upstream.event_code = "bad\ncode".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EventCodeNotHeaderSafe]);
    }
}
