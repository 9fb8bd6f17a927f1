//! kubelet-tls-proxy
//!
//! Accepts plain HTTP and relays every request to a single HTTPS upstream,
//! presenting a client certificate taken from a kubeconfig or from explicit
//! certificate/key/CA files.
//!
//! ```text
//!   client ──HTTP──▶ ProxyServer ──▶ Relay ──HTTPS (mTLS)──▶ target
//! ```

use kubelet_proxy::config::Cli;
use kubelet_proxy::lifecycle::startup;
use kubelet_proxy::observability::logging;

#[tokio::main]
async fn main() {
    logging::init();

    let result = match Cli::parse_args().into_config() {
        Ok(config) => startup::run(config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Proxy terminated");
        std::process::exit(1);
    }
}
