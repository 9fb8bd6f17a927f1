//! Response handling.
//!
//! # Responsibilities
//! - Hand the upstream response back to the client, streaming the body
//! - Strip hop-by-hop headers, keeping the upgrade pair on 101 responses
//! - Map upstream failures to 502 Bad Gateway

use axum::{
    body::{Body, Bytes, HttpBody},
    http::{Response, StatusCode},
    response::IntoResponse,
    BoxError,
};

use crate::security::headers::{restore_upgrade, strip_hop_by_hop, upgrade_protocol};

/// Convert an upstream response into the response returned to the client.
/// Status, headers and body pass through unchanged apart from hop-by-hop headers.
pub fn relay_response<B>(response: Response<B>) -> Response<Body>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let (mut parts, body) = response.into_parts();
    let upgrade = if parts.status == StatusCode::SWITCHING_PROTOCOLS {
        upgrade_protocol(&parts.headers)
    } else {
        None
    };

    strip_hop_by_hop(&mut parts.headers);
    if let Some(protocol) = upgrade {
        restore_upgrade(&mut parts.headers, protocol);
    }
    Response::from_parts(parts, Body::new(body))
}

/// Response sent when the upstream could not be reached.
pub fn bad_gateway() -> Response<Body> {
    StatusCode::BAD_GATEWAY.into_response()
}
