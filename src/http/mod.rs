//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Secure listener (TLS or plain):
//!     → server.rs (catch-all Axum handler)
//!     → request.rs (director: rewrite URI, X-Forwarded-For, log)
//!     → headers.rs (drop hop-by-hop headers)
//!     → upstream client
//!     → response.rs (relay status, headers, streamed body)
//!
//! Upgrade listener (plain):
//!     → upgrade.rs (302 to the https equivalent)
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;
pub mod upgrade;

pub use request::{Director, ForwardedFor};
pub use response::ProxyError;
pub use server::ProxyServer;
