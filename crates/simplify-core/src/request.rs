//! Tokenization request assembly.
//!
//! Turns a card [`Value`] (plus optional 3-D Secure data) into a fully formed
//! HTTP request. The API key decides the endpoint: `lvpb_` keys go to the live
//! API, anything else that passes validation goes to the sandbox.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Url};

use crate::config::DeviceInfo;
use crate::encoder::encode;
use crate::error::{Result, SimplifyError};
use crate::value::Value;

pub const LIVE_BASE_URL: &str = "https://api.simplify.com/v1/api";
pub const SANDBOX_BASE_URL: &str = "https://sandbox.simplify.com/v1/api";
pub const CARD_TOKEN_PATH: &str = "/payment/cardToken";

/// Prefix of live public keys.
pub const LIVE_KEY_PREFIX: &str = "lvpb_";

/// Product token at the start of the User-Agent.
pub const SDK_NAME: &str = "Rust-SDK";

static API_KEY_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?:lv|sb)pb_.+$").ok());

/// Whether `key` looks like a live or sandbox public key.
pub fn validate_api_key(key: &str) -> bool {
    API_KEY_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(key))
}

/// Whether `key` selects the live endpoint.
pub fn is_live(key: &str) -> bool {
    key.starts_with(LIVE_KEY_PREFIX)
}

/// A public API key that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// # Errors
    /// [`SimplifyError::InvalidApiKey`] unless the key matches `^(lv|sb)pb_.+$`.
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if validate_api_key(&key) {
            Ok(Self(key))
        } else {
            Err(SimplifyError::InvalidApiKey)
        }
    }

    pub fn is_live(&self) -> bool {
        is_live(&self.0)
    }

    /// The API base this key talks to.
    pub fn base_url(&self) -> &'static str {
        if self.is_live() {
            LIVE_BASE_URL
        } else {
            SANDBOX_BASE_URL
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `<name>/<version> ( Device: <model>; OS: <os>; Bundle: <id> )`.
///
/// The Bundle entry is left out when no bundle id is known.
pub fn user_agent(sdk_version: &str, device: &DeviceInfo, bundle_id: Option<&str>) -> String {
    let mut entries = vec![
        format!("Device: {}", device.model),
        format!("OS: {}", device.os_version),
    ];
    if let Some(bundle) = bundle_id {
        entries.push(format!("Bundle: {bundle}"));
    }
    format!("{SDK_NAME}/{sdk_version} ( {} )", entries.join("; "))
}

/// The JSON document posted to the tokenization endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizationPayload {
    pub card: Value,
    pub key: String,
    pub secure3d_request_data: Option<Value>,
}

impl TokenizationPayload {
    /// `{card, key[, secure3DRequestData]}`.
    pub fn to_value(&self) -> Value {
        let mut payload = Value::new();
        payload.set("card", self.card.clone());
        payload.set("key", self.key.as_str());
        if let Some(data) = &self.secure3d_request_data {
            payload.set("secure3DRequestData", data.clone());
        }
        payload
    }
}

/// A request ready to hand to a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct CardTokenRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Build the `POST <base>/payment/cardToken` request.
///
/// # Errors
/// [`SimplifyError::Serialization`] when the payload cannot be encoded, and
/// [`SimplifyError::Configuration`] when the User-Agent is not a valid header
/// value.
pub fn build_card_token_request(
    card: &Value,
    secure3d_request_data: Option<&Value>,
    api_key: &ApiKey,
    user_agent: &str,
) -> Result<CardTokenRequest> {
    let payload = TokenizationPayload {
        card: card.clone(),
        key: api_key.as_str().to_string(),
        secure3d_request_data: secure3d_request_data.cloned(),
    };
    let body = encode(&payload.to_value())?;

    let url = Url::parse(&format!("{}{CARD_TOKEN_PATH}", api_key.base_url())).map_err(|e| {
        SimplifyError::Configuration {
            message: format!("invalid endpoint: {e}"),
        }
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).map_err(|e| SimplifyError::Configuration {
            message: format!("invalid User-Agent: {e}"),
        })?,
    );

    Ok(CardTokenRequest {
        method: Method::POST,
        url,
        headers,
        body,
    })
}
