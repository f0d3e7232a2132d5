//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Failed to write default config: {0}")]
    Write(std::io::Error),
}

impl ConfigError {
    /// True when the config file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// On-disk document format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }

    fn default_document(self) -> &'static str {
        match self {
            ConfigFormat::Yaml => DEFAULT_YAML,
            ConfigFormat::Toml => DEFAULT_TOML,
        }
    }
}

/// Parse a config document without touching the filesystem.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<ProxyConfig, ConfigError> {
    let mut config: ProxyConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    config.address = config.normalized_address().to_string();

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate configuration from a YAML or TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Write a commented default document for the operator to edit.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let document = ConfigFormat::from_path(path).default_document();
    fs::write(path, document).map_err(ConfigError::Write)
}

const DEFAULT_YAML: &str = r#"# Proxy port
port: 5243

# Use HTTPS (true/false)
https: false

# HTTPS certificate file (if https is true)
certFile: server.crt

# HTTPS key file (if https is true)
keyFile: server.key

# Alist server address
address: http://your-alist-server

# Alist server API token
token: alist-xxx

# User-Agent header to use
userAgent: Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36

# Log filter used when RUST_LOG is not set
logLevel: info

# Prometheus metrics listener (remove to disable)
# metricsAddress: 127.0.0.1:9090
"#;

const DEFAULT_TOML: &str = r#"# Proxy port
port = 5243

# Use HTTPS (true/false)
https = false

# HTTPS certificate file (if https is true)
certFile = "server.crt"

# HTTPS key file (if https is true)
keyFile = "server.key"

# Alist server address
address = "http://your-alist-server"

# Alist server API token
token = "alist-xxx"

# User-Agent header to use
userAgent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"

# Log filter used when RUST_LOG is not set
logLevel = "info"

# Prometheus metrics listener (remove to disable)
# metricsAddress = "127.0.0.1:9090"
"#;
