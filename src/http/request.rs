//! Request handling and transformation.
//!
//! # Responsibilities
//! - Extract the signed path and its `sign` parameter
//! - Read the request ID assigned by the middleware stack
//!
//! # Design Decisions
//! - The path is percent-decoded before verification; signatures cover the
//!   decoded form
//! - Only the path is signed; other query parameters are ignored

use axum::http::{HeaderMap, HeaderName, Uri};
use percent_encoding::percent_decode_str;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Query parameter holding the signature.
pub const SIGN_PARAM: &str = "sign";

/// A file path and the signature presented for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub path: String,
    pub signature: String,
}

impl SignedRequest {
    pub fn from_uri(uri: &Uri) -> Self {
        let path = percent_decode_str(uri.path()).decode_utf8_lossy().into_owned();
        let signature = uri
            .query()
            .and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == SIGN_PARAM)
                    .map(|(_, value)| value.into_owned())
            })
            .unwrap_or_default();

        Self { path, signature }
    }
}

/// Request ID set by the middleware, or `unknown`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_decoded_path_and_sign() {
        let uri: Uri = "/%E7%94%B5%E5%BD%B1/a%20b.mkv?foo=1&sign=q83vEjRWeJA%3D:0"
            .parse()
            .unwrap();
        let signed = SignedRequest::from_uri(&uri);
        assert_eq!(signed.path, "/电影/a b.mkv");
        assert_eq!(signed.signature, "q83vEjRWeJA=:0");
    }

    #[test]
    fn raw_equals_sign_in_value_survives() {
        let uri: Uri = "/f?sign=abc=:1700000000".parse().unwrap();
        assert_eq!(SignedRequest::from_uri(&uri).signature, "abc=:1700000000");
    }

    #[test]
    fn missing_sign_is_empty() {
        let uri: Uri = "/movie.mp4".parse().unwrap();
        let signed = SignedRequest::from_uri(&uri);
        assert_eq!(signed.path, "/movie.mp4");
        assert_eq!(signed.signature, "");
    }

    #[test]
    fn request_id_falls_back() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, "abc".parse().unwrap());
        assert_eq!(request_id(&headers), "abc");
    }
}
