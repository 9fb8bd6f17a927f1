//! Credential loading errors. All of them are fatal at startup.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("read {what} failed: {}, {source}", path.display())]
    ReadFile {
        what: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse kubeconfig {} failed: {source}", path.display())]
    ParseKubeconfig {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("kubeconfig {} has no current-context", path.display())]
    NoCurrentContext { path: PathBuf },

    #[error("context {0:?} not found in kubeconfig")]
    MissingContext(String),

    #[error("cluster {0:?} not found in kubeconfig")]
    MissingCluster(String),

    #[error("user {0:?} not found in kubeconfig")]
    MissingUser(String),

    #[error("user {user:?} has neither {field}-data nor {field}")]
    MissingClientData { user: String, field: &'static str },

    #[error("decode {field} failed: {source}")]
    Base64 {
        field: &'static str,
        source: base64::DecodeError,
    },

    #[error("malformed PEM in {what}: {source}")]
    Pem {
        what: &'static str,
        source: std::io::Error,
    },

    #[error("no certificate found in {0}")]
    NoCertificates(&'static str),

    #[error("no private key found in {0}")]
    NoPrivateKey(&'static str),

    #[error("load x509 key pair failed: {0}")]
    Tls(#[from] rustls::Error),
}
