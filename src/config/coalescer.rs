//! Event coalescer configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::CoalescerConfig;

/// Event coalescer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CoalescerSettings {
    /// Quiet period in seconds before a batch flushes
    #[serde(default = "default_quiet_period")]
    pub quiet_period_secs: u64,
}

impl CoalescerSettings {
    /// Get quiet period as Duration
    pub fn quiet_period(&self) -> Duration {
        Duration::from_secs(self.quiet_period_secs)
    }

    /// Build the coalescer's runtime config
    pub fn to_config(&self) -> CoalescerConfig {
        CoalescerConfig {
            quiet_period: self.quiet_period(),
        }
    }

    /// Validate coalescer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.quiet_period_secs == 0 {
            return Err(ValidationError::InvalidQuietPeriod);
        }
        Ok(())
    }
}

impl Default for CoalescerSettings {
    fn default() -> Self {
        Self {
            quiet_period_secs: default_quiet_period(),
        }
    }
}

fn default_quiet_period() -> u64 {
    30
}
