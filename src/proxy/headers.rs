//! Outbound header construction.
//!
//! Headers sent to a resolved link are built by overlaying three layers, each
//! replacing same-named headers from the layer before it:
//!
//! 1. the client's request headers, minus `Host`, `Content-Length` and
//!    hop-by-hop headers (they describe the inbound connection only)
//! 2. the headers the link API attached to the resolved link
//! 3. the configured User-Agent, if any

use std::collections::HashMap;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

/// Connection-scoped headers that must not cross the proxy.
pub const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Whether `name` is hop-by-hop, including names listed in `Connection`.
pub fn is_hop_by_hop(name: &HeaderName, headers: &HeaderMap) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
        || headers
            .get_all(header::CONNECTION)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|token| name.as_str().eq_ignore_ascii_case(token.trim()))
}

/// Build the header set for a request to a resolved link.
pub fn merge_outbound_headers(
    client: &HeaderMap,
    extra: &HashMap<String, Vec<String>>,
    user_agent: Option<&str>,
) -> HeaderMap {
    let mut merged = HeaderMap::with_capacity(client.len() + extra.len() + 1);

    for (name, value) in client {
        if *name == header::HOST || *name == header::CONTENT_LENGTH || is_hop_by_hop(name, client) {
            continue;
        }
        merged.append(name.clone(), value.clone());
    }

    for (name, values) in extra {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::warn!(header = %name, "Skipping invalid link header name");
            continue;
        };
        merged.remove(&name);
        for value in values {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    merged.append(name.clone(), value);
                }
                Err(_) => tracing::warn!(header = %name, "Skipping invalid link header value"),
            }
        }
    }

    if let Some(ua) = user_agent.and_then(|ua| HeaderValue::from_str(ua).ok()) {
        merged.insert(header::USER_AGENT, ua);
    }

    merged
}
