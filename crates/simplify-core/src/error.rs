//! Error types for card tokenization.
//!
//! Every failure a caller can observe is a [`SimplifyError`]. Construction-time
//! failures (`InvalidApiKey`, `Configuration`) are returned synchronously; all
//! others are delivered through the single result of a tokenization call.

use std::fmt;

use thiserror::Error;

use crate::path::Path;
use crate::value::Value;

/// Errors that can occur while building, sending, or interpreting a request.
#[derive(Error, Debug)]
pub enum SimplifyError {
    /// The API key does not look like a live (`lvpb_`) or sandbox (`sbpb_`) public key.
    #[error("Invalid API Key")]
    InvalidApiKey,

    /// The tokenization payload could not be encoded (e.g. a non-finite double).
    #[error("unable to encode payload: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The connection failed. Certificate pin rejections land here too and are
    /// intentionally indistinguishable from other network failures.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The transport completed without an HTTP status.
    #[error("Non HTTP Response")]
    NonHttpResponse,

    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A response body could not be represented as a [`Value`].
    #[error("invalid data at {path}: {message}")]
    InvalidData { path: Path, message: String },

    /// A card token is missing a field required for 3-D Secure authentication.
    #[error("Card token must contain '{0}'")]
    MissingField(String),

    /// The HTTP client, TLS stack, or a header value could not be set up.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

/// A failure reported by the API itself.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    /// `error.message` from the response body, or a fixed fallback.
    pub message: String,
    /// The HTTP status, if one was received.
    pub status_code: Option<u16>,
    /// The decoded response body.
    pub body: Option<Value>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>, body: Option<Value>) -> Self {
        Self {
            message: message.into(),
            status_code,
            body,
        }
    }
}

/// An opaque network-level failure.
///
/// Carries a message and, optionally, the underlying cause. It exposes no
/// classification, so a cancelled TLS handshake looks the same as
/// a refused connection.
#[derive(Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportError")
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|s| s.to_string()))
            .finish()
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::with_source(error.to_string(), error)
    }
}

/// Convenience alias used throughout simplify-core.
pub type Result<T> = std::result::Result<T, SimplifyError>;
