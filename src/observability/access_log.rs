//! Per-request access log.
//!
//! One line per terminal outcome, emitted on the `access` target so it can be
//! filtered independently (`RUST_LOG=access=info`). The subscriber adds the
//! timestamp.

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, Version};

use crate::observability::metrics;

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// File delivered.
    Info,
    /// Link could not be resolved.
    Fail,
    /// Download failed after resolution.
    Error,
    /// Signature rejected.
    Unauthorized,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Info => "info",
            Outcome::Fail => "fail",
            Outcome::Error => "error",
            Outcome::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request details captured before the request is consumed.
#[derive(Debug, Clone)]
pub struct AccessEntry {
    pub remote: SocketAddr,
    pub method: Method,
    pub version: Version,
    pub path: String,
    pub request_id: String,
    pub started: Instant,
}

macro_rules! access_event {
    ($level:ident, $outcome:expr, $entry:expr, $status:expr, $detail:expr) => {
        tracing::$level!(
            target: "access",
            kind = %$outcome,
            client = %$entry.remote,
            method = %$entry.method,
            protocol = ?$entry.version,
            path = %$entry.path,
            status = $status,
            request_id = %$entry.request_id,
            elapsed_ms = $entry.started.elapsed().as_millis() as u64,
            "{}",
            $detail
        )
    };
}

/// Record the terminal outcome of a request.
pub fn record(outcome: Outcome, entry: &AccessEntry, status: u16, detail: Option<&dyn fmt::Display>) {
    let detail = detail.map(ToString::to_string).unwrap_or_default();

    match outcome {
        Outcome::Info => access_event!(info, outcome, entry, status, detail),
        Outcome::Fail => access_event!(warn, outcome, entry, status, detail),
        Outcome::Unauthorized => access_event!(warn, outcome, entry, status, detail),
        Outcome::Error => access_event!(error, outcome, entry, status, detail),
    }

    metrics::record_request(outcome.as_str(), &entry.method, status, entry.started);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_names() {
        let names: Vec<_> = [Outcome::Info, Outcome::Fail, Outcome::Error, Outcome::Unauthorized]
            .iter()
            .map(|o| o.to_string())
            .collect();
        assert_eq!(names, ["info", "fail", "error", "unauthorized"]);
    }

    #[test]
    fn recording_without_subscriber_is_harmless() {
        let entry = AccessEntry {
            remote: "127.0.0.1:50000".parse().unwrap(),
            method: Method::GET,
            version: Version::HTTP_11,
            path: "/movie.mp4".into(),
            request_id: "test".into(),
            started: Instant::now(),
        };
        record(Outcome::Unauthorized, &entry, 401, Some(&"sign invalid"));
        record(Outcome::Info, &entry, 200, None);
    }
}
