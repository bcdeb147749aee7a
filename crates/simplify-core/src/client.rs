//! The tokenization client.

use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::pinning::PinSet;
use crate::request::{self, ApiKey, CardTokenRequest};
use crate::response::interpret;
use crate::transport::{HttpTransport, Transport};
use crate::value::Value;

/// Exchanges card details for a card token.
///
/// Cheap to clone; clones share the validated key and the transport. Calls
/// are independent and may run concurrently.
#[derive(Clone)]
pub struct Simplify {
    inner: Arc<Inner>,
}

struct Inner {
    api_key: ApiKey,
    user_agent: String,
    transport: Arc<dyn Transport>,
}

impl Simplify {
    /// Validate the API key and set up the pinned HTTP transport.
    ///
    /// # Errors
    /// [`SimplifyError::InvalidApiKey`](crate::SimplifyError::InvalidApiKey)
    /// for a malformed key; `Configuration` if the TLS stack cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let api_key = ApiKey::parse(config.api_key.as_str())?;
        let pins = PinSet::from_pem_strings(&config.pinned_certificates);
        debug!(pins = pins.len(), live = api_key.is_live(), "creating client");
        let transport = HttpTransport::pinned(pins, &config.transport)?;
        Ok(Self::assemble(api_key, &config, Arc::new(transport)))
    }

    /// Like [`Simplify::new`], sending through `transport` instead.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let api_key = ApiKey::parse(config.api_key.as_str())?;
        Ok(Self::assemble(api_key, &config, transport))
    }

    fn assemble(api_key: ApiKey, config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let user_agent = request::user_agent(
            &config.sdk_version,
            &config.device,
            config.bundle_id.as_deref(),
        );
        Self {
            inner: Arc::new(Inner {
                api_key,
                user_agent,
                transport,
            }),
        }
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.inner.api_key
    }

    pub fn user_agent(&self) -> &str {
        &self.inner.user_agent
    }

    /// The request [`Simplify::create_card_token`] would send.
    pub fn build_card_token_request(
        &self,
        card: &Value,
        secure3d_request_data: Option<&Value>,
    ) -> Result<CardTokenRequest> {
        request::build_card_token_request(
            card,
            secure3d_request_data,
            &self.inner.api_key,
            &self.inner.user_agent,
        )
    }

    /// Tokenize a card.
    ///
    /// `card` is `{number, expMonth, expYear, cvc}`; `secure3d_request_data`,
    /// when given, asks the API to prepare a 3-D Secure challenge. A payload
    /// that cannot be encoded fails without touching the network.
    pub async fn create_card_token(
        &self,
        card: &Value,
        secure3d_request_data: Option<&Value>,
    ) -> Result<Value> {
        let request = self.build_card_token_request(card, secure3d_request_data)?;
        debug!(
            method = %request.method,
            url = %request.url,
            headers = ?request.headers,
            body_len = request.body.len(),
            "sending card token request"
        );
        interpret(self.inner.transport.send(request).await)
    }

    /// Tokenize a card and hand the result to `completion`.
    ///
    /// Returns immediately. `completion` runs exactly once, on a Tokio worker,
    /// and never before this call has returned. Must be called from within a
    /// Tokio runtime.
    pub fn create_card_token_with<F>(&self, card: Value, secure3d_request_data: Option<Value>, completion: F)
    where
        F: FnOnce(Result<Value>) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client
                .create_card_token(&card, secure3d_request_data.as_ref())
                .await;
            completion(result);
        });
    }
}

impl std::fmt::Debug for Simplify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simplify")
            .field("api_key", &self.inner.api_key)
            .field("user_agent", &self.inner.user_agent)
            .finish_non_exhaustive()
    }
}
