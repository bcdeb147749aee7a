//! Response interpretation.
//!
//! Classifies one finished exchange, in order:
//!
//! 1. a transport failure is passed through untouched
//! 2. no HTTP status means [`SimplifyError::NonHttpResponse`]
//! 3. the body is decoded; no body decodes to `Null`
//! 4. 2xx returns the decoded body
//! 5. anything else becomes an [`ApiError`] carrying `error.message`

use crate::decoder::decode;
use crate::error::{ApiError, Result, SimplifyError, TransportError};
use crate::path::Path;
use crate::value::Value;

/// Used when a failed response does not carry `error.message`.
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred";

/// What the transport got back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status, if the exchange was HTTP at all.
    pub status: Option<u16>,
    pub body: Option<Vec<u8>>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
        }
    }
}

/// Turn a transport result into the caller-facing result.
pub fn interpret(outcome: std::result::Result<TransportResponse, TransportError>) -> Result<Value> {
    let response = outcome?;
    let status = response.status.ok_or(SimplifyError::NonHttpResponse)?;

    let decoded = match response.body.as_deref() {
        Some(bytes) if !bytes.is_empty() => decode(bytes)?,
        _ => Value::Null,
    };

    if (200..300).contains(&status) {
        return Ok(decoded);
    }

    let message = decoded
        .at(&Path::root().key("error").key("message"))
        .string_value()
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
    Err(ApiError::new(message, Some(status), Some(decoded)).into())
}
