//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (optional deadline on the upstream response)
//!     → On failure: answered with a gateway error, never retried
//! ```
//!
//! # Design Decisions
//! - A single upstream means there is nothing to fail over to
//! - Retries are out of scope; request bodies are streamed, not buffered

pub mod timeouts;
