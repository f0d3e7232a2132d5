//! Request pipeline: verify → resolve → forward → stream.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::{request_id, SignedRequest};
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::access_log::{self, AccessEntry, Outcome};
use crate::observability::metrics;
use crate::proxy::forward::{ForwardError, Forwarded};
use crate::proxy::sanitize::sanitize_headers;
use crate::proxy::stream::LoggedBody;

/// Maximum re-resolutions triggered by self-redirects for one request.
pub const MAX_SELF_REDIRECTS: usize = 10;

/// Entry point for every inbound request.
pub async fn download_handler(
    State(state): State<AppState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let signed = SignedRequest::from_uri(request.uri());
    let entry = AccessEntry {
        remote,
        method: request.method().clone(),
        version: request.version(),
        path: signed.path.clone(),
        request_id: request_id(request.headers()),
        started: Instant::now(),
    };

    if let Err(e) = state.signer.verify(&signed.path, &signed.signature) {
        return reject(ProxyError::from(e), &entry);
    }

    // The request body is never forwarded.
    let (parts, _body) = request.into_parts();

    let upstream = match fetch(&state, &parts.method, &parts.headers, signed.path).await {
        Ok(upstream) => upstream,
        Err(e) => return reject(e, &entry),
    };

    let status = upstream.status();
    let headers = sanitize_headers(upstream.headers());

    // Responses that never carry a body are logged right away.
    let bodiless = parts.method == Method::HEAD
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED;

    let body = if bodiless {
        access_log::record(Outcome::Info, &entry, status.as_u16(), None);
        Body::empty()
    } else {
        Body::from_stream(LoggedBody::new(upstream, entry))
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Resolve `path` and forward it, re-resolving on self-redirects.
///
/// Self-redirects come from the resolver's own response chain, so the new
/// path is not signature-checked again.
pub async fn fetch(
    state: &AppState,
    method: &Method,
    client_headers: &HeaderMap,
    mut path: String,
) -> Result<reqwest::Response, ProxyError> {
    for _ in 0..=MAX_SELF_REDIRECTS {
        let link = state.resolver.resolve(&path).await?;

        match state.forwarder.forward(method, client_headers, &link).await? {
            Forwarded::Response(response) => return Ok(response),
            Forwarded::SelfRedirect(next) => {
                metrics::record_self_redirect();
                tracing::debug!(from = %path, to = %next, "Re-resolving self-redirect");
                path = next;
            }
        }
    }

    Err(ForwardError::TooManyRedirects(MAX_SELF_REDIRECTS).into())
}

fn reject(error: ProxyError, entry: &AccessEntry) -> Response {
    access_log::record(error.outcome(), entry, error.status().as_u16(), Some(&error));
    error.into_response()
}
