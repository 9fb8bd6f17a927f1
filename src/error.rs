//! Top-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::credentials::CredentialError;
use crate::net::listener::ListenerError;

/// Anything that stops the proxy from starting or serving.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),
}

pub type ProxyResult<T> = Result<T, ProxyError>;
