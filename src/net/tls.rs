//! TLS configuration and certificate loading.
//!
//! Without both a certificate and a key the secure listener degrades to
//! plain HTTP. With both, any failure to load them is fatal.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// How the secure listener serves its connections.
pub enum SecureMode {
    Tls(RustlsConfig),
    Plaintext,
}

impl SecureMode {
    pub fn is_tls(&self) -> bool {
        matches!(self, SecureMode::Tls(_))
    }
}

/// Decide the secure listener mode from the configured certificate paths.
pub async fn secure_mode(tls: &TlsConfig) -> Result<SecureMode, io::Error> {
    match tls.pair() {
        Some((cert, key)) => {
            let config = load_tls_config(cert, key).await.map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("{} / {}: {}", cert.display(), key.display(), e),
                )
            })?;
            tracing::info!(cert = %cert.display(), key = %key.display(), "TLS certificate loaded");
            Ok(SecureMode::Tls(config))
        }
        None => {
            tracing::warn!(
                cert = ?tls.cert_path,
                key = ?tls.key_path,
                "TLS certificate or key not configured, secure listener will serve plain HTTP"
            );
            Ok(SecureMode::Plaintext)
        }
    }
}

/// Load TLS configuration from PEM certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, io::Error> {
    RustlsConfig::from_pem_file(cert_path, key_path).await
}
