//! TLS-terminating reverse proxy with a plaintext upgrade listener.
//!
//! ```text
//!   http client ──▶ upgrade listener ──▶ 302 https://host/uri
//!
//!   https client ──▶ secure listener ──▶ director ──▶ target
//!                     (TLS or plain)        │
//!                                           └── X-Forwarded-For, URI rewrite, access log
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use http::ProxyServer;
pub use lifecycle::{Shutdown, Supervisor};
