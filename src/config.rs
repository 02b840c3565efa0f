//! Runtime tunables for the control loop and remote link.
//!
//! These are compile-time defaults today; the struct is serde-ready so a
//! future settings page can override them.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Control loop period (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Delay before retrying a failed or lost connection (milliseconds)
    pub reconnect_backoff_ms: u32,
    /// Mirror the four control flags as device attributes
    pub publish_attributes: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            control_loop_interval_ms: 100, // 10 Hz
            reconnect_backoff_ms: 5000,
            publish_attributes: true,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10..=1000).contains(&self.control_loop_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be 10–1000",
            ));
        }
        if !(500..=60_000).contains(&self.reconnect_backoff_ms) {
            return Err(ConfigError::ValidationFailed(
                "reconnect_backoff_ms must be 500–60000",
            ));
        }
        Ok(())
    }
}
