//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! Keys are camelCase so existing `config.yaml` files keep working.

use serde::{Deserialize, Serialize};

/// Root configuration for the download proxy.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyConfig {
    /// Port to listen on (all interfaces).
    pub port: u16,

    /// Serve HTTPS instead of plain HTTP.
    pub https: bool,

    /// PEM certificate, used only when `https` is set.
    pub cert_file: String,

    /// PEM private key, used only when `https` is set.
    pub key_file: String,

    /// Base URL of the upstream file-listing API (e.g. `http://alist:5244`).
    pub address: String,

    /// Shared secret. Signs download links and authorizes resolver calls.
    pub token: String,

    /// User-Agent sent on requests to resolved links.
    pub user_agent: Option<String>,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Prometheus exporter bind address. Disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 5243,
            https: false,
            cert_file: "server.crt".to_string(),
            key_file: "server.key".to_string(),
            address: "http://your-alist-server".to_string(),
            token: "alist-xxx".to_string(),
            user_agent: None,
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

impl ProxyConfig {
    /// Address the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Configured outbound User-Agent, ignoring blank values.
    pub fn outbound_user_agent(&self) -> Option<&str> {
        self.user_agent
            .as_deref()
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
    }

    /// Upstream base address with trailing slashes removed.
    pub fn normalized_address(&self) -> &str {
        self.address.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_agent_is_ignored() {
        let mut config = ProxyConfig::default();
        assert_eq!(config.outbound_user_agent(), None);

        config.user_agent = Some("   ".into());
        assert_eq!(config.outbound_user_agent(), None);

        config.user_agent = Some("VLC/3.0".into());
        assert_eq!(config.outbound_user_agent(), Some("VLC/3.0"));
    }

    #[test]
    fn address_trailing_slashes_are_trimmed() {
        let config = ProxyConfig {
            address: "http://alist.local:5244//".into(),
            ..ProxyConfig::default()
        };
        assert_eq!(config.normalized_address(), "http://alist.local:5244");
    }
}
