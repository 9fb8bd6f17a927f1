//! TCP listener for the plain-HTTP front end.
//!
//! # Responsibilities
//! - Accept Go-style `:port` addresses as well as `host:port`
//! - Bind the configured address; failure is fatal, there is no fallback port

use std::io;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Serve(io::Error),
}

/// Turn `:8039` into `0.0.0.0:8039`; anything else is passed through.
pub fn normalize_listen_address(raw: &str) -> String {
    if raw.starts_with(':') {
        format!("0.0.0.0{raw}")
    } else {
        raw.to_string()
    }
}

/// Bind the listen address given on the command line.
pub async fn bind(raw: &str) -> Result<TcpListener, ListenerError> {
    let address = normalize_listen_address(raw);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| ListenerError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::debug!(address = %local_addr, "Listener bound");
    }
    Ok(listener)
}
