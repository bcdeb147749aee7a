//! Client configuration.

use serde::{Deserialize, Serialize};

/// Everything a [`Simplify`](crate::Simplify) client is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Public API key (`lvpb_...` or `sbpb_...`).
    pub api_key: String,

    /// PEM-encoded certificates the server chain must contain one of.
    #[serde(default)]
    pub pinned_certificates: Vec<String>,

    /// Version reported in the User-Agent.
    #[serde(default = "default_sdk_version")]
    pub sdk_version: String,

    /// Identifier of the host application, if any.
    #[serde(default)]
    pub bundle_id: Option<String>,

    #[serde(default)]
    pub device: DeviceInfo,

    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_sdk_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl ClientConfig {
    /// A config with default metadata and no pinned certificates.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            pinned_certificates: Vec::new(),
            sdk_version: default_sdk_version(),
            bundle_id: None,
            device: DeviceInfo::default(),
            transport: TransportConfig::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `SIMPLIFY_API_KEY` | Public API key |
    /// | `SIMPLIFY_BUNDLE_ID` | Host application identifier |
    /// | `SIMPLIFY_TIMEOUT_SECS` | Request timeout in seconds |
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("SIMPLIFY_API_KEY").unwrap_or_default());
        config.bundle_id = std::env::var("SIMPLIFY_BUNDLE_ID").ok();
        if let Some(timeout) = std::env::var("SIMPLIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.transport.timeout_secs = timeout;
        }
        config
    }

    /// Add a pinned certificate in PEM form.
    pub fn with_pinned_certificate(mut self, pem: impl Into<String>) -> Self {
        self.pinned_certificates.push(pem.into());
        self
    }

    /// Replace the pinned certificates.
    pub fn with_pinned_certificates<I, S>(mut self, pems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pinned_certificates = pems.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = version.into();
        self
    }

    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// Host description reported in the User-Agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInfo {
    pub model: String,
    pub os_version: String,
}

impl DeviceInfo {
    pub fn new(model: impl Into<String>, os_version: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            os_version: os_version.into(),
        }
    }
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self::new(std::env::consts::ARCH, std::env::consts::OS)
    }
}

/// HTTP transport settings.
///
/// The transport keeps no state between requests: no cookie jar, no cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}
