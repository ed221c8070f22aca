//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (text or JSON formatter on stderr)
//! ```
//!
//! # Design Decisions
//! - Log level comes from `RUST_LOG`, defaulting to `info`
//! - Per-request access records are emitted by the director

pub mod logging;

pub use logging::init_logging;
