//! The single upstream origin every request is relayed to.

use std::fmt;

use axum::http::{
    uri::{Authority, PathAndQuery, Scheme},
    HeaderValue, Uri,
};
use url::Url;

use crate::config::ConfigError;

/// Upstream HTTPS origin, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct TargetOrigin {
    url: Url,
    authority: Authority,
    host_header: HeaderValue,
}

impl TargetOrigin {
    /// Parse and validate the `--target` flag.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidTarget {
            target: raw.to_string(),
            source,
        })?;

        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| ConfigError::MissingHost(raw.to_string()))?;

        // `Url` drops a port equal to the scheme default, but requests always
        // go out over https, so `http://node:80` must keep `:80`.
        let written_port = raw
            .parse::<Uri>()
            .ok()
            .and_then(|uri| uri.authority().and_then(Authority::port_u16));
        let authority = match written_port.or(url.port()) {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let authority: Authority = authority
            .parse()
            .map_err(|_| ConfigError::InvalidAuthority(raw.to_string()))?;
        let host_header = HeaderValue::from_str(authority.as_str())
            .map_err(|_| ConfigError::InvalidAuthority(raw.to_string()))?;

        if url.scheme() != "https" {
            tracing::warn!(
                target_url = %url,
                "target scheme is not https; requests are still sent over https"
            );
        }

        Ok(Self {
            url,
            authority,
            host_header,
        })
    }

    /// `host[:port]` of the upstream.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Value written into the outbound `Host` header.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host_header
    }

    /// Rewrite an inbound request URI onto this origin.
    ///
    /// Scheme and authority always come from the target; whatever the
    /// client sent for them is discarded. The inbound path is joined onto
    /// the target's base path and both query strings are kept.
    pub fn rewrite_uri(&self, inbound: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_path(self.url.path(), inbound.path());
        let query: Vec<&str> = [self.url.query(), inbound.query()]
            .into_iter()
            .flatten()
            .filter(|q| !q.is_empty())
            .collect();

        let path_and_query = if query.is_empty() {
            path
        } else {
            format!("{}?{}", path, query.join("&"))
        };

        Uri::builder()
            .scheme(Scheme::HTTPS)
            .authority(self.authority.clone())
            .path_and_query(PathAndQuery::try_from(path_and_query)?)
            .build()
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "https://{}", self.authority)
    }
}

/// Join two path segments with exactly one slash between them.
fn join_path(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}
