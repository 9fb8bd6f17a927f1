//! Protocol switches (`101 Switching Protocols`).
//!
//! Once both sides have switched, the proxy stops speaking HTTP and copies
//! raw bytes between the client and the upstream until either side closes.
//! This is what kubelet exec, attach and port-forward streams ride on.

use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

/// Join the two upgraded connections and pump bytes between them in the background.
pub fn spawn_tunnel(client: OnUpgrade, upstream: OnUpgrade) {
    tokio::spawn(async move {
        let (client, upstream) = match tokio::try_join!(client, upstream) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "Protocol upgrade failed");
                return;
            }
        };

        let mut client = TokioIo::new(client);
        let mut upstream = TokioIo::new(upstream);
        match tokio::io::copy_bidirectional(&mut client, &mut upstream).await {
            Ok((sent, received)) => {
                tracing::debug!(sent, received, "Upgraded connection closed")
            }
            Err(e) => tracing::debug!(error = %e, "Upgraded connection ended"),
        }
    });
}
