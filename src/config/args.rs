//! Command-line flags.
//!
//! Flags override values from the optional config file, which in turn
//! override the built-in defaults of [`ProxyConfig`].

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::{LogFormat, ProxyConfig};

#[derive(Debug, Parser)]
#[command(name = "upgrade-proxy")]
#[command(version)]
#[command(about = "TLS reverse proxy with an HTTP to HTTPS upgrade listener", long_about = None)]
pub struct Args {
    /// Target destination of the proxy [default: http://localhost:8080]
    #[arg(long, value_name = "URL")]
    pub target: Option<String>,

    /// Upgrade listener address, empty disables it [default: :80]
    #[arg(short = 'u', value_name = "ADDR")]
    pub upgrade_address: Option<String>,

    /// Secure listener address, empty disables it [default: :443]
    #[arg(short = 'a', value_name = "ADDR")]
    pub secure_address: Option<String>,

    /// Path of the certificate file (PEM)
    #[arg(long, value_name = "FILE")]
    pub cert: Option<PathBuf>,

    /// Path of the private key file (PEM)
    #[arg(long, value_name = "FILE")]
    pub key: Option<PathBuf>,

    /// Replace any incoming X-Forwarded-For header instead of appending to it
    #[arg(long)]
    pub strip_forwarded_for: bool,

    /// Log output format [default: text]
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub formatter: Option<LogFormat>,

    /// Colourise text logs
    #[arg(long)]
    pub color: bool,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds to wait for upstream response headers (unbounded if unset)
    #[arg(long, value_name = "SECONDS")]
    pub upstream_timeout: Option<u64>,

    /// Seconds to wait for listeners to stop after a shutdown signal [default: 0]
    #[arg(long, value_name = "SECONDS")]
    pub drain_timeout: Option<u64>,
}

impl Args {
    /// Build the effective configuration.
    pub fn into_config(self) -> Result<ProxyConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Overlay explicitly given flags on `config`.
    pub fn apply(self, mut config: ProxyConfig) -> ProxyConfig {
        if let Some(target) = self.target {
            config.target = target;
        }
        if let Some(addr) = self.upgrade_address {
            config.upgrade_address = addr;
        }
        if let Some(addr) = self.secure_address {
            config.secure_address = addr;
        }
        if self.cert.is_some() {
            config.tls.cert_path = self.cert;
        }
        if self.key.is_some() {
            config.tls.key_path = self.key;
        }
        if self.strip_forwarded_for {
            config.strip_forwarded_for = true;
        }
        if let Some(format) = self.formatter {
            config.logging.format = format;
        }
        if self.color {
            config.logging.color = true;
        }
        if self.upstream_timeout.is_some() {
            config.timeouts.upstream_secs = self.upstream_timeout;
        }
        if let Some(secs) = self.drain_timeout {
            config.timeouts.drain_secs = secs;
        }
        config
    }
}
