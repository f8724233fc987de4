// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables for the scheduling loop and portal access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cadence of the scheduler tick
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Upper bound on concurrently executing jobs
    pub max_concurrent: usize,
    /// Timeout applied to every portal call
    #[serde(with = "humantime_serde")]
    pub portal_timeout: Duration,
    /// Abandon queue admission when the estimated wait exceeds this
    #[serde(with = "humantime_serde")]
    pub queue_wait_ceiling: Duration,
    /// Poll cadence while waiting for queue admission
    #[serde(with = "humantime_serde")]
    pub queue_poll_interval: Duration,
    /// Refresh an active session when this close to its expiry
    #[serde(with = "humantime_serde")]
    pub queue_refresh_margin: Duration,
    /// Retries per provider before a delivery is marked failed
    pub notify_retry_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(20),
            max_concurrent: 4,
            portal_timeout: Duration::from_secs(30),
            queue_wait_ceiling: Duration::from_secs(15 * 60),
            queue_poll_interval: Duration::from_secs(2),
            queue_refresh_margin: Duration::from_secs(60),
            notify_retry_limit: 1,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "tick_interval must be positive".to_string(),
            ));
        }
        if self.portal_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "portal_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
