//! Outbound `Authorization` selection.

use axum::http::HeaderValue;

use crate::proxy::path::UpstreamPath;

/// Which credential, if any, the outbound request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// The caller's own header, passed through untouched.
    Forwarded(HeaderValue),
    /// The configured event code.
    EventCode,
    /// No `Authorization` header.
    Omitted,
}

impl Authorization {
    /// First match wins: caller header, then the credential marker, then none.
    pub fn decide(
        inbound: Option<&HeaderValue>,
        path: &UpstreamPath,
        credential_marker: &str,
    ) -> Self {
        match inbound {
            Some(value) => Self::Forwarded(value.clone()),
            None if path.contains(credential_marker) => Self::EventCode,
            None => Self::Omitted,
        }
    }

    /// Label for logs; never the credential itself.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Forwarded(_) => "forwarded",
            Self::EventCode => "event_code",
            Self::Omitted => "none",
        }
    }

    /// Resolve to the header value to send.
    pub fn header_value(
        self,
        event_code: &str,
    ) -> Result<Option<HeaderValue>, axum::http::header::InvalidHeaderValue> {
        match self {
            Self::Forwarded(value) => Ok(Some(value)),
            Self::EventCode => HeaderValue::from_str(event_code).map(Some),
            Self::Omitted => Ok(None),
        }
    }
}
