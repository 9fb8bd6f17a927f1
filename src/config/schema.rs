//! Runtime configuration assembled from the command line.

use crate::config::TargetOrigin;
use crate::credentials::CredentialSource;

/// Root configuration for the proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream origin every request is relayed to.
    pub target: TargetOrigin,

    /// Listen address as given on the command line (e.g. ":8039").
    pub listen_address: String,

    /// Where the upstream client credentials come from.
    pub credentials: CredentialSource,
}
