//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration, or write a default one
//! - Start the metrics exporter when configured
//! - Bind the listener (plain or TLS) and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, write_default_config, ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::net::tls::load_tls_config;
use crate::observability::metrics;

/// Result of looking for the config file.
#[derive(Debug)]
pub enum Startup {
    /// Config loaded and validated.
    Ready(ProxyConfig),
    /// No config existed; a default one was written here.
    DefaultWritten(PathBuf),
}

/// Fatal errors after the config has been loaded.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid listen address '{0}'")]
    Address(String),

    #[error("failed to bind {0}: {1}")]
    Bind(String, #[source] std::io::Error),

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load the config at `path`, writing a default document if it is absent.
pub fn bootstrap(path: &Path) -> Result<Startup, ConfigError> {
    match load_config(path) {
        Ok(config) => Ok(Startup::Ready(config)),
        Err(e) if e.is_not_found() => {
            write_default_config(path)?;
            Ok(Startup::DefaultWritten(path.to_path_buf()))
        }
        Err(e) => Err(e),
    }
}

/// Serve until `shutdown` is triggered.
pub async fn run(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    if let Some(metrics_address) = &config.metrics_address {
        match metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.bind_address();
    let https = config.https;
    let cert_file = PathBuf::from(&config.cert_file);
    let key_file = PathBuf::from(&config.key_file);

    let server = HttpServer::new(config)?;
    tracing::info!(
        bind_address = %bind_address,
        upstream = %server.config().address,
        https,
        "Configuration loaded"
    );

    if https {
        let addr: SocketAddr = bind_address
            .parse()
            .map_err(|_| StartupError::Address(bind_address.clone()))?;
        let tls = load_tls_config(&cert_file, &key_file)
            .await
            .map_err(StartupError::Tls)?;
        server
            .run_tls(addr, tls, shutdown.subscribe())
            .await
            .map_err(StartupError::Serve)
    } else {
        let listener = TcpListener::bind(&bind_address)
            .await
            .map_err(|e| StartupError::Bind(bind_address.clone(), e))?;
        server
            .run(listener, shutdown.subscribe())
            .await
            .map_err(StartupError::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_config_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        match bootstrap(&path).unwrap() {
            Startup::DefaultWritten(written) => assert_eq!(written, path),
            Startup::Ready(_) => panic!("expected a default config to be written"),
        }
        assert!(path.exists());

        assert!(matches!(bootstrap(&path).unwrap(), Startup::Ready(_)));
    }

    #[test]
    fn unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("config.yaml");
        assert!(matches!(bootstrap(&path), Err(ConfigError::Write(_))));
    }

    #[test]
    fn invalid_config_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "port: [").unwrap();

        assert!(matches!(bootstrap(&path), Err(ConfigError::Yaml(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "port: [");
    }
}
