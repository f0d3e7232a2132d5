//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port non-zero, address is an http(s) URL)
//! - Require TLS material only when HTTPS is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("port must be non-zero")]
    ZeroPort,

    #[error("address '{0}' is not an absolute http(s) URL")]
    InvalidAddress(String),

    #[error("token must not be empty")]
    EmptyToken,

    #[error("{0} is required when https is enabled")]
    MissingTlsFile(&'static str),
}

/// Check every semantic rule and collect all failures.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let address = config.normalized_address();
    match Url::parse(address) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::InvalidAddress(config.address.clone())),
    }

    if config.token.is_empty() {
        errors.push(ValidationError::EmptyToken);
    }

    if config.https {
        if config.cert_file.trim().is_empty() {
            errors.push(ValidationError::MissingTlsFile("certFile"));
        }
        if config.key_file.trim().is_empty() {
            errors.push(ValidationError::MissingTlsFile("keyFile"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
