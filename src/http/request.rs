//! Outbound request preparation.
//!
//! # Responsibilities
//! - Force scheme and authority to the target origin
//! - Replace the Host header with the target authority
//! - Strip hop-by-hop headers and record the client in X-Forwarded-For
//! - Keep `Connection: upgrade` and `Upgrade` when the client asks to switch protocols
//!
//! The body is moved through untouched so it streams to the upstream.

use std::net::IpAddr;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, Version},
};

use crate::config::TargetOrigin;
use crate::security::headers::{
    accepts_trailers, append_forwarded_for, restore_upgrade, strip_hop_by_hop, upgrade_protocol,
};

/// Rewrite an inbound request so it can be sent to `target`.
pub fn prepare_upstream_request(
    request: Request<Body>,
    target: &TargetOrigin,
    client_ip: Option<IpAddr>,
) -> Result<Request<Body>, axum::http::Error> {
    let (mut parts, body) = request.into_parts();

    parts.uri = target.rewrite_uri(&parts.uri)?;
    // The upstream connector only negotiates HTTP/1.1.
    parts.version = Version::HTTP_11;

    let keep_trailers = accepts_trailers(&parts.headers);
    let upgrade = upgrade_protocol(&parts.headers);
    strip_hop_by_hop(&mut parts.headers);
    if keep_trailers {
        parts
            .headers
            .insert(header::TE, HeaderValue::from_static("trailers"));
    }
    if let Some(protocol) = upgrade {
        restore_upgrade(&mut parts.headers, protocol);
    }

    parts
        .headers
        .insert(header::HOST, target.host_header().clone());

    if let Some(ip) = client_ip {
        append_forwarded_for(&mut parts.headers, ip);
    }

    Ok(Request::from_parts(parts, body))
}
