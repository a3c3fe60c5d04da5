//! Gate behavior configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Timing knobs for sessions, retention, and the expiry sweep
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Admin guided-flow session lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Subscriber record retention in days
    #[serde(default = "default_subscriber_ttl")]
    pub subscriber_ttl_days: u64,

    /// Grant age at which an expiry sweep revokes access, in days
    #[serde(default = "default_sweep_max_age")]
    pub sweep_max_age_days: u64,
}

impl GateConfig {
    /// Get session TTL as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Get subscriber retention as Duration
    pub fn subscriber_ttl(&self) -> Duration {
        Duration::from_secs(self.subscriber_ttl_days * 24 * 3600)
    }

    /// Get sweep threshold as Duration
    pub fn sweep_max_age(&self) -> Duration {
        Duration::from_secs(self.sweep_max_age_days * 24 * 3600)
    }

    /// Validate gate configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_ttl_secs == 0 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.subscriber_ttl_days == 0 {
            return Err(ValidationError::InvalidSubscriberTtl);
        }
        if self.sweep_max_age_days == 0 {
            return Err(ValidationError::InvalidSweepMaxAge);
        }
        Ok(())
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            subscriber_ttl_days: default_subscriber_ttl(),
            sweep_max_age_days: default_sweep_max_age(),
        }
    }
}

fn default_session_ttl() -> u64 {
    300
}

fn default_subscriber_ttl() -> u64 {
    180
}

fn default_sweep_max_age() -> u64 {
    30
}
