//! TCP listener binding.
//!
//! # Responsibilities
//! - Normalize and bind a configured address
//! - Report the bound address (useful with port 0)
//! - Hand the socket to the plain or TLS server

use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::net::address::normalize_bind_address;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Failed to bind to address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The server on a bound socket failed.
    #[error("{name} listener failed: {source}")]
    Serve {
        name: &'static str,
        #[source]
        source: io::Error,
    },

    /// The server on a bound socket returned without being asked to stop.
    #[error("{0} listener stopped unexpectedly")]
    Stopped(&'static str),

    /// A listener task panicked or was cancelled.
    #[error("listener task aborted: {0}")]
    Aborted(#[source] tokio::task::JoinError),
}

/// A bound TCP socket, not yet serving.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to `addr`. A bare `:port` binds every interface.
    pub async fn bind(addr: &str) -> Result<Self, ListenerError> {
        let normalized = normalize_bind_address(addr);
        let bind_err = |source| ListenerError::Bind {
            addr: addr.to_string(),
            source,
        };

        let inner = TcpListener::bind(normalized.as_str()).await.map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;

        tracing::info!(address = %local_addr, configured = addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn into_inner(self) -> TcpListener {
        self.inner
    }

    /// Convert into a non-blocking std socket, as `axum_server` expects.
    pub fn into_std(self) -> Result<std::net::TcpListener, ListenerError> {
        let addr = self.local_addr.to_string();
        self.inner
            .into_std()
            .map_err(|source| ListenerError::Bind { addr, source })
    }
}
