//! Certificate pinning: the trust evaluator behind every TLS handshake.
//!
//! A server is trusted only if two independent gates both pass:
//!
//! 1. the standard chain validation (signatures, expiry, host name) of the
//!    default verifier, and
//! 2. at least one certificate of the presented chain is byte-for-byte equal
//!    to a pinned certificate.
//!
//! The second gate never rescues a failure of the first. There is no partial,
//! wildcard, or public-key-only matching.
//!
//! [`TrustEvaluator`] implements rustls' [`ServerCertVerifier`], so it plugs
//! straight into a `rustls::ClientConfig`. A rejection aborts the handshake with
//! a generic certificate error; the caller cannot tell it apart from any other
//! connection failure.

use std::fmt;
use std::sync::{Arc, LazyLock};

use base64::{engine::general_purpose::STANDARD, Engine};
use regex::Regex;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, RootCertStore, SignatureScheme};
use tracing::{debug, warn};

use crate::error::{Result, SimplifyError};

const PEM_CERTIFICATE_PREFIX: &str = "-----BEGIN CERTIFICATE-----";
const PEM_CERTIFICATE_SUFFIX: &str = "-----END CERTIFICATE-----";

// ============================================================================
// PinSet
// ============================================================================

/// The DER bytes of every pinned certificate. Immutable once built.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PinSet {
    certificates: Arc<[Vec<u8>]>,
}

impl PinSet {
    /// Build a pin set from raw DER certificates.
    pub fn from_der<I>(certificates: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            certificates: certificates.into_iter().collect(),
        }
    }

    /// Build a pin set from single-certificate PEM strings.
    ///
    /// Each string has its `BEGIN`/`END CERTIFICATE` markers and all whitespace
    /// removed and is then base64-decoded. Entries that do not decode are
    /// skipped with a warning; they can only ever make the set stricter.
    pub fn from_pem_strings<I, S>(pems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let certificates = pems
            .into_iter()
            .enumerate()
            .filter_map(|(index, pem)| match STANDARD.decode(normalize_pem(pem.as_ref())) {
                Ok(der) => Some(der),
                Err(error) => {
                    warn!(index, %error, "skipping pinned certificate that is not valid base64");
                    None
                }
            });
        Self::from_der(certificates)
    }

    /// Build a pin set from text holding any number of PEM certificate blocks,
    /// such as a CA bundle file. Text outside the blocks is ignored.
    pub fn from_pem_bundle(bundle: &str) -> Result<Self> {
        Ok(Self::from_pem_strings(pem_blocks(bundle)?))
    }

    /// Whether `der` is exactly one of the pinned certificates.
    pub fn contains(&self, der: &[u8]) -> bool {
        self.certificates.iter().any(|pinned| pinned.as_slice() == der)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.certificates.iter().map(Vec::as_slice)
    }
}

impl fmt::Debug for PinSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinSet")
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

static PEM_BLOCK: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)-----BEGIN CERTIFICATE-----.*?-----END CERTIFICATE-----"));

/// Every `BEGIN`/`END CERTIFICATE` block of `bundle`, markers included.
pub fn pem_blocks(bundle: &str) -> Result<Vec<&str>> {
    let re = PEM_BLOCK.as_ref().map_err(|e| SimplifyError::Configuration {
        message: format!("invalid PEM block pattern: {e}"),
    })?;
    Ok(re.find_iter(bundle).map(|m| m.as_str()).collect())
}

fn normalize_pem(pem: &str) -> String {
    pem.replace(PEM_CERTIFICATE_PREFIX, "")
        .replace(PEM_CERTIFICATE_SUFFIX, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

// ============================================================================
// Trust evaluation
// ============================================================================

/// An authentication challenge raised while establishing a connection.
#[derive(Debug)]
pub enum Challenge<'a> {
    /// The server presented its certificate chain and asks to be trusted.
    ServerTrust(PresentedChain<'a>),
    /// The server asked for a client certificate. Never answered.
    ClientCertificate,
}

/// The certificate chain a server presented, with the handshake context the
/// default verifier needs.
#[derive(Debug)]
pub struct PresentedChain<'a> {
    pub end_entity: &'a CertificateDer<'a>,
    pub intermediates: &'a [CertificateDer<'a>],
    pub server_name: &'a ServerName<'a>,
    pub ocsp_response: &'a [u8],
    pub now: UnixTime,
}

impl<'a> PresentedChain<'a> {
    /// Every certificate of the chain, leaf first.
    pub fn certificates(&self) -> impl Iterator<Item = &'a CertificateDer<'a>> + '_ {
        std::iter::once(self.end_entity).chain(self.intermediates.iter())
    }
}

/// What to do with a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Continue with the default handling of the now-trusted credential.
    PerformDefaultHandling,
    /// Abort the handshake.
    CancelChallenge,
}

/// Decides whether a server's certificate chain is acceptable.
pub struct TrustEvaluator {
    default_verifier: Arc<dyn ServerCertVerifier>,
    pins: PinSet,
}

impl TrustEvaluator {
    /// A trust evaluator whose default validation uses the Mozilla root store
    /// shipped in `webpki-roots`.
    pub fn new(pins: PinSet, provider: Arc<CryptoProvider>) -> Result<Self> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let default_verifier = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .map_err(|e| SimplifyError::Configuration {
                message: format!("failed to build certificate verifier: {e}"),
            })?;
        Ok(Self::with_default_verifier(default_verifier, pins))
    }

    /// A trust evaluator on top of an arbitrary default verifier.
    pub fn with_default_verifier(default_verifier: Arc<dyn ServerCertVerifier>, pins: PinSet) -> Self {
        Self {
            default_verifier,
            pins,
        }
    }

    pub fn pins(&self) -> &PinSet {
        &self.pins
    }

    /// Evaluate one challenge.
    pub fn evaluate(&self, challenge: &Challenge<'_>) -> Disposition {
        let chain = match challenge {
            Challenge::ServerTrust(chain) => chain,
            Challenge::ClientCertificate => {
                debug!("cancelling non server-trust challenge");
                return Disposition::CancelChallenge;
            }
        };

        if let Err(error) = self.default_verifier.verify_server_cert(
            chain.end_entity,
            chain.intermediates,
            chain.server_name,
            chain.ocsp_response,
            chain.now,
        ) {
            debug!(%error, "default chain validation failed");
            return Disposition::CancelChallenge;
        }

        if chain.certificates().any(|cert| self.pins.contains(cert.as_ref())) {
            debug!(server = ?chain.server_name, "pinned certificate found in chain");
            Disposition::PerformDefaultHandling
        } else {
            debug!(server = ?chain.server_name, "no pinned certificate in chain");
            Disposition::CancelChallenge
        }
    }
}

impl fmt::Debug for TrustEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustEvaluator")
            .field("pins", &self.pins)
            .finish_non_exhaustive()
    }
}

impl ServerCertVerifier for TrustEvaluator {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        let challenge = Challenge::ServerTrust(PresentedChain {
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        });
        match self.evaluate(&challenge) {
            Disposition::PerformDefaultHandling => Ok(ServerCertVerified::assertion()),
            Disposition::CancelChallenge => Err(rustls::Error::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            )),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.default_verifier.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.default_verifier.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.default_verifier.supported_verify_schemes()
    }
}
