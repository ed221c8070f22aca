//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (ProxyConfig::default)
//!     → loader.rs (optional TOML file)
//!     → args.rs (command-line flags override)
//!     → validation.rs (semantic checks, target parsed)
//!     → ProxyConfig + Target (validated, immutable)
//!     → passed explicitly to the director and the supervisor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once built; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde, clap) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod target;
pub mod validation;

pub use args::Args;
pub use loader::ConfigError;
pub use schema::{LogFormat, LoggingConfig, ProxyConfig, TimeoutConfig, TlsConfig};
pub use target::{Target, TargetError};
pub use validation::{validate_config, ValidationError};
