//! Upstream client credentials.
//!
//! # Data Flow
//! ```text
//! flags
//!     → CredentialSource (kubeconfig | explicit files | none)
//!     → kubeconfig.rs / fs reads (raw PEM bytes)
//!     → pem.rs (CA pool, client chain, private key)
//!     → TlsTransportConfig (immutable, consumed by net::tls)
//! ```
//!
//! # Design Decisions
//! - Exactly one source is active; a kubeconfig path shadows the explicit
//!   files completely, nothing is merged
//! - Any failure is fatal at startup; there is no partial or fallback state
//! - Upstream certificate verification is disabled whenever credentials are
//!   configured (self-signed kubelet serving certs). The client certificate
//!   is still always presented.

pub mod error;
pub mod kubeconfig;
pub mod pem;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::RootCertStore;

pub use error::CredentialError;

/// Where the upstream client identity comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Current context of a kubeconfig file.
    ClusterConfig(PathBuf),
    /// Client certificate, client key and CA bundle files.
    ExplicitFiles {
        cert: PathBuf,
        key: PathBuf,
        ca: PathBuf,
    },
    /// No client credentials; the default transport is used.
    None,
}

impl CredentialSource {
    /// Pick the active source from raw flag values. Empty means unset.
    pub fn select(kubeconfig: &str, cert: &str, key: &str, ca: &str) -> Self {
        if !kubeconfig.is_empty() {
            CredentialSource::ClusterConfig(PathBuf::from(kubeconfig))
        } else if !cert.is_empty() && !key.is_empty() && !ca.is_empty() {
            CredentialSource::ExplicitFiles {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
                ca: PathBuf::from(ca),
            }
        } else {
            CredentialSource::None
        }
    }

    /// Resolve the source into a transport configuration.
    pub fn load(&self) -> Result<Option<TlsTransportConfig>, CredentialError> {
        let config = match self {
            CredentialSource::ClusterConfig(path) => {
                let creds = kubeconfig::load(path)?;
                tracing::info!(path = %path.display(), "use kubeconfig");
                TlsTransportConfig::from_pem(
                    creds.ca.as_deref().unwrap_or_default(),
                    &creds.cert,
                    &creds.key,
                    "kubeconfig",
                )?
            }
            CredentialSource::ExplicitFiles { cert, key, ca } => {
                let ca_pem = read(ca, "cAFile")?;
                let cert_pem = read(cert, "certFile")?;
                let key_pem = read(key, "keyFile")?;
                tracing::info!(cert = %cert.display(), key = %key.display(), ca = %ca.display(), "use certificate files");
                TlsTransportConfig::from_pem(&ca_pem, &cert_pem, &key_pem, "certificate files")?
            }
            CredentialSource::None => {
                tracing::info!("no client credentials configured; using default transport");
                return Ok(None);
            }
        };

        tracing::warn!(
            roots = config.roots.len(),
            "upstream certificate verification is disabled; the backend is trusted without validation"
        );
        Ok(Some(config))
    }
}

fn read(path: &Path, what: &'static str) -> Result<Vec<u8>, CredentialError> {
    fs::read(path).map_err(|source| CredentialError::ReadFile {
        what,
        path: path.to_path_buf(),
        source,
    })
}

/// Whether the upstream's certificate is checked against the trusted roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerVerification {
    Verify,
    /// Accept any upstream certificate. Handshake signatures are still checked.
    Disabled,
}

/// Resolved client identity and trust settings for the upstream connection.
pub struct TlsTransportConfig {
    /// Trusted CA roots. Not consulted while verification is disabled.
    pub roots: RootCertStore,
    pub cert_chain: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
    pub verification: PeerVerification,
}

impl TlsTransportConfig {
    /// Build from PEM material as loaded from either source.
    pub fn from_pem(
        ca: &[u8],
        cert: &[u8],
        key: &[u8],
        what: &'static str,
    ) -> Result<Self, CredentialError> {
        Ok(Self {
            roots: pem::root_store(ca, what)?,
            cert_chain: pem::certificate_chain(cert, what)?,
            key: pem::private_key(key, what)?,
            verification: PeerVerification::Disabled,
        })
    }
}

impl fmt::Debug for TlsTransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsTransportConfig")
            .field("roots", &self.roots.len())
            .field("cert_chain", &self.cert_chain.len())
            .field("verification", &self.verification)
            .finish_non_exhaustive()
    }
}
