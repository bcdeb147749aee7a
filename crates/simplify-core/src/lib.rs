//! # simplify-core
//!
//! Client core for tokenizing payment cards against the **Simplify Commerce** API.
//!
//! Card details go in as a [`Value`], are posted over a TLS connection pinned to
//! a fixed certificate set, and come back as either the card token (another
//! `Value`) or a structured [`SimplifyError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use simplify_core::{Card, ClientConfig, Simplify};
//!
//! # async fn run() -> simplify_core::Result<()> {
//! let config = ClientConfig::new("sbpb_your_public_key")
//!     .with_pinned_certificate("-----BEGIN CERTIFICATE-----\nMIIF...\n-----END CERTIFICATE-----");
//! let simplify = Simplify::new(config)?;
//!
//! let card = Card::new("5555555555554444", "12", "99", "123").to_value().unwrap_or_default();
//! let token = simplify.create_card_token(&card, None).await?;
//! println!("token id: {:?}", token["id"].string_value());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`value`]: the `Value` tree with never-failing reads and coercions
//! - [`path`]: explicit key/index paths into a `Value`
//! - [`encoder`] / [`decoder`]: `Value` to and from JSON bytes
//! - [`pinning`]: `PinSet` and the `TrustEvaluator` TLS verifier
//! - [`request`]: API key validation, endpoint selection, request assembly
//! - [`response`]: classifying a finished exchange as success or error
//! - [`transport`]: the `Transport` seam and the pinned `HttpTransport`
//! - [`client`]: `Simplify`, the orchestrator tying it all together
//! - [`secure3d`]: 3-D Secure challenge and result handling
//! - [`config`], [`types`], [`error`]

pub mod client;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod path;
pub mod pinning;
pub mod request;
pub mod response;
pub mod secure3d;
pub mod transport;
pub mod types;
pub mod value;

pub use client::Simplify;
pub use config::{ClientConfig, DeviceInfo, TransportConfig};
pub use decoder::{decode, decode_str};
pub use encoder::{encode, encode_to_string};
pub use error::{ApiError, Result, SimplifyError, TransportError};
pub use path::{Path, PathSegment};
pub use pinning::{pem_blocks, Challenge, Disposition, PinSet, PresentedChain, TrustEvaluator};
pub use request::{
    build_card_token_request, is_live, user_agent, validate_api_key, ApiKey, CardTokenRequest,
    TokenizationPayload,
};
pub use response::{interpret, TransportResponse};
pub use secure3d::{is_enrolled, Secure3dChallenge, Secure3dOutcome};
pub use transport::{HttpTransport, Transport};
pub use types::{Card, Secure3dRequestData};
pub use value::{Segment, Value, DEFAULT};
