//! HTTP to HTTPS reverse proxy for kubelet-style mutual TLS backends.

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::{ProxyServer, Relay};
