//! Session configuration (JSON)

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::counter::{DEFAULT_SAMPLE_INTERVAL, DEFAULT_WINDOW_TICKS};
use crate::error::ComputeError;
use crate::thresholds::{ThresholdTable, DEFAULT_THRESHOLDS};

/// Settings for one activity session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ascending tier boundaries in actions per minute
    #[serde(default = "default_thresholds")]
    pub thresholds: Vec<f64>,
    /// Length of one sampling interval in milliseconds
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Ticks per counting window before counts reset
    #[serde(default = "default_window_ticks")]
    pub window_ticks: u32,
}

fn default_thresholds() -> Vec<f64> {
    DEFAULT_THRESHOLDS.to_vec()
}

fn default_sample_interval_ms() -> u64 {
    DEFAULT_SAMPLE_INTERVAL.as_millis() as u64
}

fn default_window_ticks() -> u32 {
    DEFAULT_WINDOW_TICKS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
            sample_interval_ms: default_sample_interval_ms(),
            window_ticks: default_window_ticks(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_path(path: &Path) -> Result<Self, ComputeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ComputeError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Check every field, returning the first problem found
    pub fn validate(&self) -> Result<(), ComputeError> {
        let result = self.check();
        if let Err(ref e) = result {
            warn!(error = %e, "rejected session config");
        }
        result
    }

    fn check(&self) -> Result<(), ComputeError> {
        self.threshold_table()?;
        if self.sample_interval_ms == 0 {
            return Err(ComputeError::InvalidConfig(
                "sample_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.window_ticks == 0 {
            return Err(ComputeError::InvalidConfig(
                "window_ticks must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the validated threshold table
    pub fn threshold_table(&self) -> Result<ThresholdTable, ComputeError> {
        ThresholdTable::new(self.thresholds.clone())
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
