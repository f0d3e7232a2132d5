//! Outbound requests to resolved links.
//!
//! # Responsibilities
//! - Request the resolved URL with the client's method and merged headers
//! - Follow external redirects by re-requesting the new location
//! - Hand self-redirects (back into the upstream's address space) to the
//!   pipeline for re-resolution
//!
//! # Design Decisions
//! - The HTTP client never follows redirects itself; every 3xx is seen here
//! - No request body is forwarded
//! - External hops are capped the same way common HTTP clients cap them

use axum::http::{header, HeaderMap, Method};
use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

use crate::proxy::headers::merge_outbound_headers;
use crate::upstream::ResolvedLink;

/// Maximum external redirects followed for one resolved link.
pub const MAX_EXTERNAL_REDIRECTS: usize = 10;

/// Errors while talking to the file host.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("download request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid download url '{0}'")]
    InvalidUrl(String),

    #[error("invalid redirect location '{0}'")]
    InvalidRedirect(String),

    #[error("too many redirects ({0})")]
    TooManyRedirects(usize),

    #[error("download interrupted: {0}")]
    Streaming(#[source] reqwest::Error),
}

/// Outcome of forwarding one resolved link.
#[derive(Debug)]
pub enum Forwarded {
    /// Final response from the file host; body not yet read.
    Response(reqwest::Response),
    /// The file host pointed back into the upstream; resolve this path next.
    SelfRedirect(String),
}

/// Where a redirect points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    SelfRedirect(String),
    External(Url),
}

/// Issues requests to resolved links. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    address: String,
    user_agent: Option<String>,
}

impl Forwarder {
    /// `client` must have redirects disabled.
    pub fn new(client: reqwest::Client, address: &str, user_agent: Option<&str>) -> Self {
        Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            user_agent: user_agent.map(str::to_string),
        }
    }

    /// Request `link` and follow redirects until a final response or a
    /// self-redirect.
    pub async fn forward(
        &self,
        method: &Method,
        client_headers: &HeaderMap,
        link: &ResolvedLink,
    ) -> Result<Forwarded, ForwardError> {
        let headers = merge_outbound_headers(
            client_headers,
            &link.extra_headers,
            self.user_agent.as_deref(),
        );
        let mut url =
            Url::parse(&link.url).map_err(|_| ForwardError::InvalidUrl(link.url.clone()))?;
        let mut hops = 0;

        loop {
            let response = self
                .client
                .request(method.clone(), url.clone())
                .headers(headers.clone())
                .send()
                .await
                .map_err(ForwardError::Transport)?;

            if !response.status().is_redirection() {
                return Ok(Forwarded::Response(response));
            }

            let location = match response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
            {
                Some(location) => location.to_string(),
                None => return Ok(Forwarded::Response(response)),
            };

            match classify_redirect(&location, &self.address, &url)? {
                RedirectTarget::SelfRedirect(path) => {
                    tracing::debug!(location = %location, path = %path, "Self-redirect, re-resolving");
                    return Ok(Forwarded::SelfRedirect(path));
                }
                RedirectTarget::External(next) => {
                    hops += 1;
                    if hops > MAX_EXTERNAL_REDIRECTS {
                        return Err(ForwardError::TooManyRedirects(MAX_EXTERNAL_REDIRECTS));
                    }
                    tracing::debug!(from = %url, to = %next, status = %response.status(), "Following redirect");
                    url = next;
                }
            }
        }
    }
}

/// Decide whether `location` re-enters the upstream at `address` or points
/// elsewhere. Relative locations resolve against `current`.
pub fn classify_redirect(
    location: &str,
    address: &str,
    current: &Url,
) -> Result<RedirectTarget, ForwardError> {
    let address = address.trim_end_matches('/');

    if let Some(path) = upstream_path(location, address) {
        return Ok(RedirectTarget::SelfRedirect(path));
    }

    let absolute = current
        .join(location)
        .map_err(|_| ForwardError::InvalidRedirect(location.to_string()))?;

    match upstream_path(absolute.as_str(), address) {
        Some(path) => Ok(RedirectTarget::SelfRedirect(path)),
        None => Ok(RedirectTarget::External(absolute)),
    }
}

/// Decoded path below `address`, if `location` starts with `{address}/`.
fn upstream_path(location: &str, address: &str) -> Option<String> {
    let rest = location
        .strip_prefix(address)
        .filter(|rest| rest.starts_with('/'))?;
    let raw_path = rest.split(['?', '#']).next().unwrap_or(rest);
    Some(percent_decode_str(raw_path).decode_utf8_lossy().into_owned())
}
