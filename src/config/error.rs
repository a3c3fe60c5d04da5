//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid store URL format")]
    InvalidStoreUrl,

    #[error("Session TTL must be positive")]
    InvalidSessionTtl,

    #[error("Subscriber retention must be positive")]
    InvalidSubscriberTtl,

    #[error("Sweep max age must be positive")]
    InvalidSweepMaxAge,
}
