//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve credentials and build the upstream transport
//! - Bind the listener only once everything else succeeded
//! - Log the startup line and serve

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::error::ProxyResult;
use crate::http::{ProxyServer, Relay};
use crate::net::{host_ip, listener};

/// Build everything the proxy needs and bind the listener.
///
/// Credential and transport errors surface here, before any socket is opened.
pub async fn prepare(config: &ProxyConfig) -> ProxyResult<(ProxyServer, TcpListener)> {
    let tls = config.credentials.load()?;
    let relay = Relay::from_transport(config.target.clone(), tls.as_ref())?;
    tracing::info!(target_origin = %relay.target(), "Relay ready");

    let listener = listener::bind(&config.listen_address).await?;
    Ok((ProxyServer::new(relay), listener))
}

/// Start the proxy and serve until Ctrl+C.
pub async fn run(config: ProxyConfig) -> ProxyResult<()> {
    let (server, listener) = prepare(&config).await?;

    let ip = host_ip::primary_ip().await;
    tracing::info!(
        "Starting HTTP to HTTPS reverse proxy server on {}{}",
        ip,
        config.listen_address
    );

    server.run(listener).await?;
    Ok(())
}
