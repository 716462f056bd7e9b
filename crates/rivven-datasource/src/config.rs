//! Channel configuration

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};

/// Default number of tables introspected concurrently
pub const DEFAULT_FAN_OUT_CONCURRENCY: usize = 8;

/// Upper bound accepted for the fan-out concurrency
pub const MAX_FAN_OUT_CONCURRENCY: usize = 1024;

/// Configuration shared by the channels of a registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChannelConfig {
    /// Maximum number of fan-out units (one per table) running at once
    #[validate(range(min = 1, max = MAX_FAN_OUT_CONCURRENCY))]
    pub fan_out_concurrency: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            fan_out_concurrency: DEFAULT_FAN_OUT_CONCURRENCY,
        }
    }
}

impl ChannelConfig {
    /// Set the fan-out concurrency
    pub fn with_fan_out_concurrency(mut self, concurrency: usize) -> Self {
        self.fan_out_concurrency = concurrency;
        self
    }

    /// Validate the configuration
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| Error::config(format!("invalid channel config: {}", e)))?;
        Ok(self)
    }
}
