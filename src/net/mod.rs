//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured address (":443", "127.0.0.1:8443", ...)
//!     → address.rs (normalize bind address)
//!     → listener.rs (bind TCP socket)
//!     → tls.rs (optional rustls configuration)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Sockets are bound before serving so bind errors surface at startup
//! - TLS is optional; without a certificate the secure listener serves plain HTTP

pub mod address;
pub mod listener;
pub mod tls;

pub use listener::{Listener, ListenerError};
