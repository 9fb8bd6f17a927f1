//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, Go-style ":port" addresses)
//!     → Hand off to HTTP layer
//!
//! Outgoing upstream connection
//!     → tls.rs (rustls client config, optional client certificate)
//! ```

pub mod host_ip;
pub mod listener;
pub mod tls;
