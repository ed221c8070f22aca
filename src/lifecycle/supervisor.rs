//! Startup orchestration and listener supervision.
//!
//! # Responsibilities
//! - Validate configuration and build the director
//! - Load TLS material and bind both listeners
//! - Serve the upgrade and secure listeners concurrently
//! - Stop everything on the first listener failure or on shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration and TLS material are checked before any socket is bound
//! - Listeners are independent tasks sharing one shutdown signal

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::config::{validate_config, ProxyConfig, ValidationError};
use crate::http::{upgrade, Director, ForwardedFor, ProxyServer};
use crate::lifecycle::Shutdown;
use crate::net::tls::{secure_mode, SecureMode};
use crate::net::{Listener, ListenerError};

const UPGRADE: &str = "upgrade";
const SECURE: &str = "secure";

/// A fatal error; the process exits with a failure status.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

struct SecureListener {
    listener: Listener,
    mode: SecureMode,
}

/// Both listeners, bound and ready to serve.
pub struct Supervisor {
    upgrade: Option<Listener>,
    secure: Option<SecureListener>,
    proxy: ProxyServer,
    drain_timeout: Duration,
    shutdown: Shutdown,
}

impl Supervisor {
    /// Validate `config`, load TLS material and bind the configured listeners.
    pub async fn bind(config: &ProxyConfig) -> Result<Self, StartupError> {
        let target = validate_config(config).map_err(StartupError::Config)?;

        tracing::info!(
            upstream = %target,
            upgrade_address = %config.upgrade_address,
            secure_address = %config.secure_address,
            strip_forwarded_for = config.strip_forwarded_for,
            "Configuration loaded"
        );

        let director = Director::new(
            Arc::new(target),
            ForwardedFor::from_strip_flag(config.strip_forwarded_for),
        );
        let proxy = ProxyServer::new(
            director,
            config.timeouts.upstream_secs.map(Duration::from_secs),
        );

        let secure = match non_empty(&config.secure_address) {
            Some(addr) => {
                let mode = secure_mode(&config.tls).await.map_err(StartupError::Tls)?;
                let listener = Listener::bind(addr).await?;
                Some(SecureListener { listener, mode })
            }
            None => None,
        };

        let upgrade = match non_empty(&config.upgrade_address) {
            Some(addr) => Some(Listener::bind(addr).await?),
            None => None,
        };

        Ok(Self {
            upgrade,
            secure,
            proxy,
            drain_timeout: Duration::from_secs(config.timeouts.drain_secs),
            shutdown: Shutdown::new(),
        })
    }

    pub fn upgrade_addr(&self) -> Option<SocketAddr> {
        self.upgrade.as_ref().map(Listener::local_addr)
    }

    pub fn secure_addr(&self) -> Option<SocketAddr> {
        self.secure.as_ref().map(|s| s.listener.local_addr())
    }

    /// Whether the secure listener terminates TLS (false in degraded mode).
    pub fn is_tls(&self) -> bool {
        self.secure.as_ref().is_some_and(|s| s.mode.is_tls())
    }

    /// Serve until `shutdown_signal` resolves or a listener fails.
    pub async fn run<F>(self, shutdown_signal: F) -> Result<(), StartupError>
    where
        F: Future<Output = ()>,
    {
        let mut tasks: JoinSet<Result<(), ListenerError>> = JoinSet::new();
        let proxy = self.proxy.into_router();

        if let Some(listener) = self.upgrade {
            tasks.spawn(serve_plain(UPGRADE, listener, upgrade::router(), self.shutdown.clone()));
        }

        if let Some(SecureListener { listener, mode }) = self.secure {
            match mode {
                SecureMode::Tls(tls) => {
                    tasks.spawn(serve_tls(listener, tls, proxy, self.shutdown.clone()));
                }
                SecureMode::Plaintext => {
                    tasks.spawn(serve_plain(SECURE, listener, proxy, self.shutdown.clone()));
                }
            }
        }

        tokio::pin!(shutdown_signal);

        tokio::select! {
            _ = &mut shutdown_signal => {
                tracing::info!("Shutdown requested, stopping listeners");
                self.shutdown.trigger();
                drain(&mut tasks, self.drain_timeout).await;
                Ok(())
            }
            Some(joined) = tasks.join_next() => {
                self.shutdown.trigger();
                match joined {
                    Ok(result) => result.map_err(StartupError::from),
                    Err(e) => Err(ListenerError::Aborted(e).into()),
                }
            }
        }
    }
}

fn non_empty(addr: &str) -> Option<&str> {
    let addr = addr.trim();
    (!addr.is_empty()).then_some(addr)
}

/// Wait up to `limit` for the listener tasks to finish; the rest are aborted.
async fn drain(tasks: &mut JoinSet<Result<(), ListenerError>>, limit: Duration) {
    if !limit.is_zero() {
        match tokio::time::timeout(limit, join_all(tasks)).await {
            Ok(()) => return,
            Err(_) => {
                tracing::warn!(drain_secs = limit.as_secs(), "Listeners did not stop in time");
            }
        }
    }

    // Aborted tasks release their sockets once joined.
    tasks.abort_all();
    join_all(tasks).await;
}

async fn join_all(tasks: &mut JoinSet<Result<(), ListenerError>>) {
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Err(e)) = joined {
            tracing::warn!(error = %e, "Listener failed while draining");
        }
    }
}

async fn serve_plain(
    name: &'static str,
    listener: Listener,
    router: Router,
    shutdown: Shutdown,
) -> Result<(), ListenerError> {
    tracing::info!(listener = name, address = %listener.local_addr(), "Serving HTTP");

    axum::serve(
        listener.into_inner(),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.notified())
    .await
    .map_err(|source| ListenerError::Serve { name, source })?;

    stopped(name, &shutdown)
}

async fn serve_tls(
    listener: Listener,
    tls: RustlsConfig,
    router: Router,
    shutdown: Shutdown,
) -> Result<(), ListenerError> {
    let address = listener.local_addr();
    let handle = axum_server::Handle::new();

    let stopper = handle.clone();
    let stop = shutdown.notified();
    tokio::spawn(async move {
        stop.await;
        stopper.graceful_shutdown(None);
    });

    tracing::info!(listener = SECURE, address = %address, "Serving HTTPS");

    axum_server::from_tcp_rustls(listener.into_std()?, tls)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|source| ListenerError::Serve { name: SECURE, source })?;

    stopped(SECURE, &shutdown)
}

fn stopped(name: &'static str, shutdown: &Shutdown) -> Result<(), ListenerError> {
    if shutdown.is_triggered() {
        tracing::info!(listener = name, "Listener stopped");
        Ok(())
    } else {
        Err(ListenerError::Stopped(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ProxyConfig {
        ProxyConfig {
            upgrade_address: "127.0.0.1:0".to_string(),
            secure_address: "127.0.0.1:0".to_string(),
            ..ProxyConfig::default()
        }
    }

    #[tokio::test]
    async fn binds_both_listeners_in_degraded_mode() {
        let supervisor = Supervisor::bind(&local_config()).await.unwrap();
        assert!(supervisor.upgrade_addr().is_some());
        assert!(supervisor.secure_addr().is_some());
        assert!(!supervisor.is_tls());
    }

    #[tokio::test]
    async fn empty_address_disables_listener() {
        let config = ProxyConfig {
            upgrade_address: String::new(),
            ..local_config()
        };
        let supervisor = Supervisor::bind(&config).await.unwrap();
        assert!(supervisor.upgrade_addr().is_none());
        assert!(supervisor.secure_addr().is_some());
    }

    #[tokio::test]
    async fn invalid_target_is_a_config_error() {
        let config = ProxyConfig {
            target: "ftp://files.example".to_string(),
            ..local_config()
        };
        let err = Supervisor::bind(&config).await.err().unwrap();
        assert!(matches!(err, StartupError::Config(_)));
    }

    #[tokio::test]
    async fn run_returns_when_signalled() {
        let supervisor = Supervisor::bind(&local_config()).await.unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            supervisor.run(std::future::ready(())),
        )
        .await
        .unwrap();
        assert!(result.is_ok());
    }
}
