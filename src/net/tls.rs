//! TLS certificate loading.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

/// Load the listener's certificate chain and private key (PEM).
pub async fn load_tls_config(cert_file: &Path, key_file: &Path) -> Result<RustlsConfig, std::io::Error> {
    for (what, path) in [("certificate", cert_file), ("private key", key_file)] {
        if !path.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("TLS {} file not found: {}", what, path.display()),
            ));
        }
    }

    RustlsConfig::from_pem_file(cert_file, key_file).await
}
