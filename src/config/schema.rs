//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Upstream base URL every request is forwarded to.
    pub target: String,

    /// Plaintext listener that redirects to HTTPS. Empty disables it.
    pub upgrade_address: String,

    /// Secure listener that proxies to the target. Empty disables it.
    pub secure_address: String,

    /// Certificate and key for the secure listener.
    pub tls: TlsConfig,

    /// Overwrite `X-Forwarded-For` instead of appending to it.
    pub strip_forwarded_for: bool,

    /// Log output settings.
    pub logging: LoggingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            target: "http://localhost:8080".to_string(),
            upgrade_address: ":80".to_string(),
            secure_address: ":443".to_string(),
            tls: TlsConfig::default(),
            strip_forwarded_for: false,
            logging: LoggingConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

/// TLS material for the secure listener.
///
/// When either path is missing the secure listener serves plain HTTP.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: Option<PathBuf>,

    /// Path to private key file (PEM).
    pub key_path: Option<PathBuf>,
}

impl TlsConfig {
    /// Both paths, if both are configured and non-empty.
    pub fn pair(&self) -> Option<(&PathBuf, &PathBuf)> {
        let set = |p: &&PathBuf| !p.as_os_str().is_empty();
        match (self.cert_path.as_ref().filter(set), self.key_path.as_ref().filter(set)) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,

    /// Colourise text output.
    pub color: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time to wait for upstream response headers, in seconds.
    /// Unset means wait indefinitely.
    pub upstream_secs: Option<u64>,

    /// Time to wait for listeners to stop after a shutdown signal, in seconds.
    pub drain_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_pair_requires_both_paths() {
        let mut tls = TlsConfig::default();
        assert!(tls.pair().is_none());

        tls.cert_path = Some(PathBuf::from("cert.pem"));
        assert!(tls.pair().is_none());

        tls.key_path = Some(PathBuf::from(""));
        assert!(tls.pair().is_none());

        tls.key_path = Some(PathBuf::from("key.pem"));
        assert!(tls.pair().is_some());
    }
}
