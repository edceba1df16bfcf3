//! Outbound body encoding.
//!
//! Registration endpoints on the upstream only accept form bodies carrying
//! the event code. Callers may send multipart, URL-encoded or JSON, so the
//! body is re-encoded by an ordered chain of strategies; the first one that
//! succeeds wins. Every other POST is forwarded as raw text.
//!
//! ```text
//! GET, any non-POST          → Empty
//! POST, registration path    → MultipartForm → JsonAsUrlEncoded → Empty
//! POST, other path           → Raw (Empty if not UTF-8)
//! ```

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{header::CONTENT_TYPE, Extensions, HeaderMap, Method, Request},
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::proxy::path::UpstreamPath;

/// Form field every registration body carries, always set by the gateway.
pub const EVENT_CODE_FIELD: &str = "event_code";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The buffered inbound body plus what is needed to re-parse it.
#[derive(Debug, Clone, Default)]
pub struct InboundBody {
    pub headers: HeaderMap,
    pub extensions: Extensions,
    pub bytes: Bytes,
}

impl InboundBody {
    pub fn new(headers: HeaderMap, extensions: Extensions, bytes: Bytes) -> Self {
        Self {
            headers,
            extensions,
            bytes,
        }
    }

    fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Lowercased media type without parameters.
    fn media_type(&self) -> Option<String> {
        self.content_type()
            .and_then(|ct| ct.split(';').next())
            .map(|mt| mt.trim().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Binary {
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FieldValue::Text(value.into()),
        }
    }
}

/// Body of the outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundBody {
    Multipart(Vec<FormField>),
    UrlEncoded(Vec<(String, String)>),
    Raw(String),
    Empty,
}

impl OutboundBody {
    /// Explicit `Content-Type` to send. Multipart leaves it to the client,
    /// which has to add the boundary parameter.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Multipart(_) => None,
            Self::UrlEncoded(_) => Some(FORM_CONTENT_TYPE),
            Self::Raw(_) | Self::Empty => Some(JSON_CONTENT_TYPE),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Multipart(_) => "multipart",
            Self::UrlEncoded(_) => "urlencoded",
            Self::Raw(_) => "raw",
            Self::Empty => "empty",
        }
    }

    /// Attach headers and body to an outbound request.
    pub fn apply(
        self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, reqwest::Error> {
        let builder = match self.content_type() {
            Some(ct) => builder.header(CONTENT_TYPE, ct),
            None => builder,
        };

        let builder = match self {
            Self::Multipart(fields) => {
                let mut form = Form::new();
                for field in fields {
                    form = match field.value {
                        FieldValue::Text(text) => form.text(field.name, text),
                        FieldValue::Binary {
                            file_name,
                            content_type,
                            data,
                        } => {
                            let mut part = Part::bytes(data.to_vec());
                            if let Some(name) = file_name {
                                part = part.file_name(name);
                            }
                            if let Some(mime) = content_type {
                                part = part.mime_str(&mime)?;
                            }
                            form.part(field.name, part)
                        }
                    };
                }
                builder.multipart(form)
            }
            Self::UrlEncoded(pairs) => {
                let encoded = form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish();
                builder.body(encoded)
            }
            Self::Raw(text) => builder.body(text),
            Self::Empty => builder,
        };

        Ok(builder)
    }
}

/// Why a strategy declined the inbound body.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("body is not form data (content-type {0:?})")]
    NotForm(Option<String>),

    #[error("malformed multipart body: {0}")]
    Multipart(String),

    #[error("body is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One way of re-encoding a registration body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingStrategy {
    /// Inbound form data (multipart or URL-encoded) to outbound multipart.
    MultipartForm,
    /// Inbound JSON document to outbound URL-encoded form.
    JsonAsUrlEncoded,
    /// No body at all.
    Empty,
}

impl EncodingStrategy {
    /// Attempt order for registration endpoints.
    pub const REGISTRATION_CHAIN: [EncodingStrategy; 3] =
        [Self::MultipartForm, Self::JsonAsUrlEncoded, Self::Empty];

    pub async fn attempt(
        self,
        inbound: &InboundBody,
        event_code: &str,
    ) -> Result<OutboundBody, EncodingError> {
        match self {
            Self::MultipartForm => {
                let fields = parse_form(inbound).await?;
                Ok(OutboundBody::Multipart(with_event_code(
                    fields,
                    event_code,
                    |f| f.name.as_str(),
                    |name, value| FormField::text(name, value),
                )))
            }
            Self::JsonAsUrlEncoded => {
                let pairs = json_pairs(&inbound.bytes)?;
                Ok(OutboundBody::UrlEncoded(with_event_code(
                    pairs,
                    event_code,
                    |(name, _)| name.as_str(),
                    |name, value| (name.to_owned(), value.to_owned()),
                )))
            }
            Self::Empty => Ok(OutboundBody::Empty),
        }
    }
}

/// Choose the outbound body for a proxied request.
pub async fn encode_body(
    method: &Method,
    path: &UpstreamPath,
    registration_endpoints: &[String],
    event_code: &str,
    inbound: &InboundBody,
) -> OutboundBody {
    if *method != Method::POST {
        return OutboundBody::Empty;
    }

    if path.contains_any(registration_endpoints) {
        return encode_registration(inbound, event_code).await;
    }

    match std::str::from_utf8(&inbound.bytes) {
        Ok(text) => OutboundBody::Raw(text.to_owned()),
        Err(e) => {
            tracing::debug!(error = %e, "Inbound body is not text, forwarding without body");
            OutboundBody::Empty
        }
    }
}

/// Run the registration chain; the first strategy to succeed wins.
pub async fn encode_registration(inbound: &InboundBody, event_code: &str) -> OutboundBody {
    for strategy in EncodingStrategy::REGISTRATION_CHAIN {
        match strategy.attempt(inbound, event_code).await {
            Ok(body) => {
                tracing::debug!(?strategy, "Registration body encoded");
                return body;
            }
            Err(e) => {
                tracing::debug!(?strategy, error = %e, "Encoding strategy declined");
            }
        }
    }
    OutboundBody::Empty
}

/// Put the gateway's event code first and drop any caller-supplied one.
fn with_event_code<T>(
    items: Vec<T>,
    event_code: &str,
    name_of: impl Fn(&T) -> &str,
    make: impl Fn(&str, &str) -> T,
) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(make(EVENT_CODE_FIELD, event_code));
    out.extend(items.into_iter().filter(|item| name_of(item) != EVENT_CODE_FIELD));
    out
}

async fn parse_form(inbound: &InboundBody) -> Result<Vec<FormField>, EncodingError> {
    match inbound.media_type().as_deref() {
        Some("multipart/form-data") => parse_multipart(inbound).await,
        Some(FORM_CONTENT_TYPE) => Ok(form_urlencoded::parse(&inbound.bytes)
            .map(|(name, value)| FormField::text(name, value))
            .collect()),
        _ => Err(EncodingError::NotForm(inbound.content_type().map(str::to_owned))),
    }
}

async fn parse_multipart(inbound: &InboundBody) -> Result<Vec<FormField>, EncodingError> {
    // Rebuild a request so axum's extractor can read the boundary and honour
    // the body limit carried in the extensions.
    let mut request = Request::new(Body::from(inbound.bytes.clone()));
    *request.headers_mut() = inbound.headers.clone();
    *request.extensions_mut() = inbound.extensions.clone();

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| EncodingError::Multipart(e.to_string()))?;

    let mut fields = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EncodingError::Multipart(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| EncodingError::Multipart(e.to_string()))?;

        let value = match (file_name, content_type) {
            (None, None) => match String::from_utf8(data.to_vec()) {
                Ok(text) => FieldValue::Text(text),
                Err(_) => FieldValue::Binary {
                    file_name: None,
                    content_type: None,
                    data,
                },
            },
            (file_name, content_type) => FieldValue::Binary {
                file_name,
                content_type,
                data,
            },
        };
        fields.push(FormField { name, value });
    }

    Ok(fields)
}

/// Form entries of a JSON document: object members by name, array elements
/// by index, nothing for a scalar. Any valid document still yields a body
/// carrying the event code.
fn json_pairs(bytes: &[u8]) -> Result<Vec<(String, String)>, EncodingError> {
    Ok(match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => map
            .into_iter()
            .map(|(name, value)| (name, form_value(&value)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), form_value(value)))
            .collect(),
        _ => Vec::new(),
    })
}

/// Text form of a JSON value as it appears in a URL-encoded form.
fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => form_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
