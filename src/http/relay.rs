//! Single-host relay to the target origin.

use std::net::IpAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    response::IntoResponse,
};

use crate::config::TargetOrigin;
use crate::credentials::{CredentialError, TlsTransportConfig};
use crate::http::request::prepare_upstream_request;
use crate::http::response::{bad_gateway, relay_response};
use crate::http::upgrade::spawn_tunnel;
use crate::net::tls::{build_client, HttpsClient};
use crate::security::headers::upgrade_protocol;

/// Forwards requests to one fixed upstream over one shared client.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct Relay {
    client: HttpsClient,
    target: Arc<TargetOrigin>,
}

impl Relay {
    pub fn new(client: HttpsClient, target: TargetOrigin) -> Self {
        Self {
            client,
            target: Arc::new(target),
        }
    }

    /// Build the upstream client from resolved credentials and bind it to `target`.
    pub fn from_transport(
        target: TargetOrigin,
        tls: Option<&TlsTransportConfig>,
    ) -> Result<Self, CredentialError> {
        Ok(Self::new(build_client(tls)?, target))
    }

    pub fn target(&self) -> &TargetOrigin {
        &self.target
    }

    /// Relay one request. One attempt; upstream failures become a 502.
    ///
    /// A `101` from the upstream turns the exchange into a byte tunnel
    /// between the two connections.
    pub async fn forward(
        &self,
        mut request: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Response<Body> {
        let client_upgrade = if upgrade_protocol(request.headers()).is_some() {
            Some(hyper::upgrade::on(&mut request))
        } else {
            None
        };

        let upstream = match prepare_upstream_request(request, &self.target, client_ip) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot rewrite request for upstream");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let uri = upstream.uri().clone();
        match self.client.request(upstream).await {
            Ok(mut response) => {
                if response.status() == StatusCode::SWITCHING_PROTOCOLS {
                    let Some(client_upgrade) = client_upgrade else {
                        tracing::error!(uri = %uri, "http: upstream switched protocols unasked");
                        return bad_gateway();
                    };
                    spawn_tunnel(client_upgrade, hyper::upgrade::on(&mut response));
                }
                relay_response(response)
            }
            Err(e) => {
                tracing::error!(uri = %uri, error = ?e, "http: proxy error");
                bad_gateway()
            }
        }
    }
}
