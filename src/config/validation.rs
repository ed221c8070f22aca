//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse the target URL before any listener is bound
//! - Require at least one enabled listener
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<Target, Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::target::{Target, TargetError};

/// A single semantic problem with the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    InvalidTarget(#[from] TargetError),

    #[error("no listeners configured: both the upgrade and secure addresses are empty")]
    NoListeners,

    #[error("upstream timeout must be greater than zero")]
    ZeroUpstreamTimeout,
}

/// Validate the configuration, returning the parsed target on success.
pub fn validate_config(config: &ProxyConfig) -> Result<Target, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = match Target::parse(&config.target) {
        Ok(target) => Some(target),
        Err(e) => {
            errors.push(ValidationError::InvalidTarget(e));
            None
        }
    };

    if config.upgrade_address.trim().is_empty() && config.secure_address.trim().is_empty() {
        errors.push(ValidationError::NoListeners);
    }

    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError::ZeroUpstreamTimeout);
    }

    match target {
        Some(target) if errors.is_empty() => Ok(target),
        _ => Err(errors),
    }
}
