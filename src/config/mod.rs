//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHANNEL_WARDEN_` prefix and nested values use underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use channel_warden::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod gate;
mod store;

pub use error::{ConfigError, ValidationError};
pub use gate::GateConfig;
pub use store::StoreConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// State store configuration (Redis connection)
    pub store: StoreConfig,

    /// Gate timing configuration (sessions, retention, sweep)
    #[serde(default)]
    pub gate: GateConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHANNEL_WARDEN` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHANNEL_WARDEN__STORE__URL=redis://...` -> `store.url = ...`
    /// - `CHANNEL_WARDEN__GATE__SESSION_TTL_SECS=300` -> `gate.session_ttl_secs = 300`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required environment variables are
    /// missing or values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHANNEL_WARDEN")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.store.validate()?;
        self.gate.validate()?;
        Ok(())
    }
}
