//! Link API client.
//!
//! # Responsibilities
//! - Ask the file-listing service for a direct link to a path
//! - Authenticate with the shared token
//! - Normalize scheme-relative URLs

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

use crate::upstream::types::{
    LinkRequest, ResolveError, ResolveResult, ResolvedLink, UpstreamEnvelope, SUCCESS_CODE,
};

/// User-Agent presented to the link API.
pub const RESOLVER_USER_AGENT: &str = "Alist-Proxy";

const LINK_ENDPOINT: &str = "/api/fs/link";

/// Resolves file paths to direct download links. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl LinkResolver {
    /// `address` is the upstream base URL without a trailing slash.
    pub fn new(client: reqwest::Client, address: &str, token: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", address.trim_end_matches('/'), LINK_ENDPOINT),
            token: token.to_string(),
        }
    }

    #[cfg(test)]
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve `path` with a single request; no retries.
    pub async fn resolve(&self, path: &str) -> ResolveResult<ResolvedLink> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .header(AUTHORIZATION, &self.token)
            .header(USER_AGENT, RESOLVER_USER_AGENT)
            .body(serde_json::to_vec(&LinkRequest { path })?)
            .send()
            .await?;

        let body = response.bytes().await?;
        let envelope: UpstreamEnvelope = serde_json::from_slice(&body)?;

        if envelope.code != SUCCESS_CODE {
            tracing::debug!(path = %path, code = envelope.code, message = %envelope.message, "Link API refused path");
            return Err(ResolveError::Upstream {
                code: envelope.code,
                message: envelope.message,
            });
        }

        let mut link = envelope.data.ok_or(ResolveError::MissingUrl)?;
        if link.url.is_empty() {
            return Err(ResolveError::MissingUrl);
        }
        link.url = normalize_url(&link.url);

        tracing::debug!(path = %path, url = %link.url, "Resolved link");
        Ok(link)
    }
}

/// Prefix `http:` onto anything that does not already carry an http scheme.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("http:{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_relative_urls_get_http() {
        assert_eq!(normalize_url("//host/f"), "http://host/f");
        assert_eq!(normalize_url("https://host/f"), "https://host/f");
        assert_eq!(normalize_url("http://host/f"), "http://host/f");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let resolver = LinkResolver::new(reqwest::Client::new(), "http://alist:5244/", "t");
        assert_eq!(resolver.endpoint(), "http://alist:5244/api/fs/link");
    }
}
