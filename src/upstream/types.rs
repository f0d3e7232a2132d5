//! Wire types and error definitions for the link API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code the link API uses for success.
pub const SUCCESS_CODE: i64 = 200;

/// Request body for `POST /api/fs/link`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkRequest<'a> {
    pub path: &'a str,
}

/// Direct download location for a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolvedLink {
    /// Absolute URL of the file.
    pub url: String,

    /// Headers the file host expects, in upstream order.
    #[serde(rename = "header", deserialize_with = "nullable_headers")]
    pub extra_headers: HashMap<String, Vec<String>>,
}

/// Envelope every link API response is wrapped in.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamEnvelope {
    pub code: i64,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub data: Option<ResolvedLink>,
}

fn nullable_headers<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<HashMap<String, Vec<String>>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Errors that can occur while resolving a path.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Request could not be sent or the body could not be read.
    #[error("link request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not a valid envelope.
    #[error("invalid link response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Link API answered with a non-success code.
    #[error("{message}")]
    Upstream { code: i64, message: String },

    /// Success envelope carrying no usable URL.
    #[error("link response has no url")]
    MissingUrl,
}

/// Result type for link resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_envelope() {
        let envelope: UpstreamEnvelope = serde_json::from_str(
            r#"{"code":200,"message":"success","data":{"url":"https://cdn/f","header":{"Referer":["https://pan"],"Cookie":["a=1","b=2"]}}}"#,
        )
        .unwrap();
        let link = envelope.data.unwrap();
        assert_eq!(link.url, "https://cdn/f");
        assert_eq!(link.extra_headers["Cookie"], vec!["a=1", "b=2"]);
    }

    #[test]
    fn tolerates_null_data_and_headers() {
        let envelope: UpstreamEnvelope =
            serde_json::from_str(r#"{"code":500,"message":"object not found","data":null}"#).unwrap();
        assert!(envelope.data.is_none());

        let envelope: UpstreamEnvelope =
            serde_json::from_str(r#"{"code":200,"data":{"url":"//h/f","header":null}}"#).unwrap();
        let link = envelope.data.unwrap();
        assert!(link.extra_headers.is_empty());
        assert_eq!(envelope.message, "");
    }
}
