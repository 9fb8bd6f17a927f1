//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line flags
//!     → cli.rs (clap parse, defaults)
//!     → target.rs (upstream URL validation)
//!     → ProxyConfig (validated, immutable)
//!     → passed explicitly to credentials, relay and listener
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload path
//! - Every flag has a default so the proxy starts with no arguments
//! - No ambient/global state: components receive what they need

pub mod cli;
pub mod schema;
pub mod target;

use thiserror::Error;

pub use cli::Cli;
pub use schema::ProxyConfig;
pub use target::TargetOrigin;

/// Errors raised while turning flags into a [`ProxyConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid target URL {target:?}: {source}")]
    InvalidTarget {
        target: String,
        source: url::ParseError,
    },

    #[error("target URL {0:?} has no host")]
    MissingHost(String),

    #[error("target URL {0:?} does not form a valid authority")]
    InvalidAuthority(String),
}
