//! Response header sanitation.
//!
//! Upstream cookies and CORS policy never reach the client; the proxy
//! publishes its own permissive CORS policy instead.

use axum::http::header::{self, HeaderMap, HeaderValue};

use crate::proxy::headers::is_hop_by_hop;

/// Turn the file host's response headers into the headers sent to the client.
pub fn sanitize_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len() + 3);

    for (name, value) in upstream {
        if *name == header::ACCESS_CONTROL_ALLOW_ORIGIN
            || *name == header::SET_COOKIE
            || is_hop_by_hop(name, upstream)
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, OPTIONS"),
    );
    headers.append(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("range"));

    headers
}
