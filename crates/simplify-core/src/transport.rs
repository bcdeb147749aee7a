//! The network seam.
//!
//! [`Transport`] is everything the client needs from the network: send one
//! request, get back a status and body or an opaque failure. [`HttpTransport`]
//! is the production implementation; its TLS handshakes are gated by a
//! [`TrustEvaluator`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::config::TransportConfig;
use crate::error::{Result, SimplifyError, TransportError};
use crate::pinning::{PinSet, TrustEvaluator};
use crate::request::CardTokenRequest;
use crate::response::TransportResponse;

/// Sends one request and reports what came back.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: CardTokenRequest) -> std::result::Result<TransportResponse, TransportError>;
}

/// A reqwest client over a pinned rustls configuration.
///
/// No cookie jar and no response cache, so nothing outlives a request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// A transport that only completes handshakes with servers whose chain
    /// passes default validation and contains one of `pins`.
    pub fn pinned(pins: PinSet, config: &TransportConfig) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let evaluator = TrustEvaluator::new(pins, provider)?;
        Self::with_trust_evaluator(evaluator, config)
    }

    /// A transport whose every handshake is decided by `evaluator`.
    pub fn with_trust_evaluator(evaluator: TrustEvaluator, config: &TransportConfig) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let tls = rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| SimplifyError::Configuration {
                message: format!("unsupported TLS protocol versions: {e}"),
            })?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(evaluator))
            .with_no_client_auth();
        Self::with_tls_config(tls, config)
    }

    /// A transport over a caller-built TLS configuration.
    pub fn with_tls_config(tls: rustls::ClientConfig, config: &TransportConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| SimplifyError::Configuration {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: CardTokenRequest) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, body_len = body.len(), "received response");

        Ok(TransportResponse {
            status: Some(status),
            body: Some(body.to_vec()),
        })
    }
}
