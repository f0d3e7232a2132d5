//! Error responses.
//!
//! # Responsibilities
//! - Aggregate per-request failures into one error type
//! - Map each failure to an HTTP status and the `{code, msg}` JSON envelope
//!
//! # Design Decisions
//! - Upstream refusals keep the upstream's own status when it is a valid
//!   4xx/5xx code; everything else after signature checks is a 500
//! - Only used before any response bytes are committed

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Outcome;
use crate::proxy::forward::ForwardError;
use crate::signing::SignatureError;
use crate::upstream::ResolveError;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: u16,
    pub msg: String,
}

/// Any failure that ends a request before the download starts.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Signature(_) => StatusCode::UNAUTHORIZED,
            ProxyError::Resolve(ResolveError::Upstream { code, .. }) => u16::try_from(*code)
                .ok()
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|status| status.is_client_error() || status.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ProxyError::Resolve(_) | ProxyError::Forward(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Access log classification.
    pub fn outcome(&self) -> Outcome {
        match self {
            ProxyError::Signature(_) => Outcome::Unauthorized,
            ProxyError::Resolve(_) => Outcome::Fail,
            ProxyError::Forward(_) => Outcome::Error,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let envelope = ErrorEnvelope {
            code: status.as_u16(),
            msg: self.to_string(),
        };
        (status, Json(envelope)).into_response()
    }
}
