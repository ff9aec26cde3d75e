//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{PodiumError, Result, constants};

/// Configuration for a settlement engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on each external write (upload, ledger commit, status
    /// update). Hitting it fails the wager, not the batch.
    pub write_timeout: Duration,
    /// Delay before the automatic advance after a fully successful batch.
    pub auto_advance_delay: Duration,
    /// Capacity of the progress event channel. Events beyond it are dropped
    /// rather than stalling settlement.
    pub progress_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            write_timeout: Duration::from_millis(constants::DEFAULT_WRITE_TIMEOUT_MS),
            auto_advance_delay: Duration::from_millis(constants::DEFAULT_AUTO_ADVANCE_DELAY_MS),
            progress_buffer: constants::DEFAULT_PROGRESS_BUFFER,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns [`PodiumError::Configuration`] for a zero timeout or buffer.
    pub fn validate(&self) -> Result<()> {
        if self.write_timeout.is_zero() {
            return Err(PodiumError::Configuration(
                "write_timeout must be greater than zero".into(),
            ));
        }
        if self.progress_buffer == 0 {
            return Err(PodiumError::Configuration(
                "progress_buffer must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_auto_advance_delay(mut self, delay: Duration) -> Self {
        self.auto_advance_delay = delay;
        self
    }

    /// Write timeout in whole milliseconds, for error reporting.
    #[must_use]
    pub fn write_timeout_ms(&self) -> u64 {
        u64::try_from(self.write_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
