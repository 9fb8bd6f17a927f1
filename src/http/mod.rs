//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, per-request log line)
//!     → relay.rs
//!         → request.rs (rewrite scheme/authority/Host, header hygiene)
//!         → upstream over TLS
//!         → response.rs (strip hop-by-hop, 502 on failure)
//!         → upgrade.rs (byte tunnel after 101 Switching Protocols)
//!     → Send to client
//! ```

pub mod relay;
pub mod request;
pub mod response;
pub mod server;
pub mod upgrade;

pub use relay::Relay;
pub use server::ProxyServer;
