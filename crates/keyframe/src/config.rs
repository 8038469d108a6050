//! # Scheduler Configuration
//!
//! Tuning knobs for the tick, loaded once at startup.
//!
//! ```toml
//! initial_capacity = 4096
//! worker_threads = 0      # 0 = rayon global pool
//! min_batch_len = 256
//! parallel = true
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{KeyframeError, KeyframeResult};

/// Configuration of an [`AnimationScheduler`](crate::AnimationScheduler).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Slots reserved in the state table up front.
    pub initial_capacity: usize,
    /// Size of a dedicated worker pool. 0 uses the rayon global pool.
    pub worker_threads: usize,
    /// Smallest number of records one advance task processes.
    pub min_batch_len: usize,
    /// Run the advance pass on the worker pool. `false` steps on the
    /// calling thread.
    pub parallel: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            worker_threads: 0,
            min_batch_len: 256,
            parallel: true,
        }
    }
}

impl SchedulerConfig {
    /// Crowd config: large table, coarse batches.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            initial_capacity: 65_536,
            worker_threads: 0,
            min_batch_len: 1024,
            parallel: true,
        }
    }

    /// Single-threaded config for tests and headless tools.
    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            initial_capacity: 64,
            worker_threads: 0,
            min_batch_len: 1,
            parallel: false,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`KeyframeError::InvalidConfig`] on malformed TOML, unknown
    /// keys, or values rejected by [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> KeyframeResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| KeyframeError::InvalidConfig(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`KeyframeError::InvalidConfig`] if the file cannot be read or
    /// its content is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> KeyframeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            KeyframeError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`KeyframeError::InvalidConfig`] if `min_batch_len` is zero or
    /// `worker_threads` is unreasonably large.
    pub fn validate(&self) -> KeyframeResult<()> {
        if self.min_batch_len == 0 {
            return Err(KeyframeError::InvalidConfig(
                "min_batch_len must be at least 1".to_string(),
            ));
        }
        if self.worker_threads > 1024 {
            return Err(KeyframeError::InvalidConfig(format!(
                "worker_threads {} exceeds the limit of 1024",
                self.worker_threads
            )));
        }
        Ok(())
    }
}
