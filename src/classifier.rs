//! Activity tier classification
//!
//! Turns a stream of keyboard/mouse rate samples into a smoothed combined rate
//! and a discrete tier. Each sample overwrites the stored tier; there is no
//! other state beyond the bounded histories.

use tracing::{debug, trace};

use crate::error::ComputeError;
use crate::history::{RateHistories, RollingHistory, SMOOTHING_WINDOW};
use crate::thresholds::ThresholdTable;
use crate::types::RateSample;

/// Classifier over rolling activity histories
#[derive(Debug, Clone)]
pub struct ActivityTierClassifier {
    histories: RateHistories,
    thresholds: ThresholdTable,
    tier: usize,
}

impl Default for ActivityTierClassifier {
    fn default() -> Self {
        Self::new(ThresholdTable::default())
    }
}

impl ActivityTierClassifier {
    /// Create a classifier at tier 0 with zero-seeded histories
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self {
            histories: RateHistories::default(),
            thresholds,
            tier: 0,
        }
    }

    /// Create a classifier from raw threshold values
    pub fn with_thresholds(thresholds: &[f64]) -> Result<Self, ComputeError> {
        Ok(Self::new(ThresholdTable::new(thresholds.to_vec())?))
    }

    /// Record one sample and recompute the tier.
    ///
    /// Inputs are not validated; negative or non-finite rates flow into the
    /// averages as given.
    pub fn record_sample(&mut self, sample: RateSample) {
        self.histories.push(sample.keyboard_rate, sample.mouse_rate);

        let smoothed = self.current_smoothed_rate();
        let tier = self.thresholds.classify(smoothed);
        trace!(
            keyboard_rate = sample.keyboard_rate,
            mouse_rate = sample.mouse_rate,
            smoothed,
            tier,
            "recorded activity sample"
        );

        if tier != self.tier {
            debug!(from = self.tier, to = tier, smoothed, "activity tier changed");
        }
        self.tier = tier;
    }

    /// Truncated mean of the last (up to five) combined rates
    pub fn current_smoothed_rate(&self) -> i64 {
        self.histories.combined.recent_mean(SMOOTHING_WINDOW)
    }

    /// Tier computed by the last `record_sample`, or 0 before any sample
    pub fn current_tier(&self) -> usize {
        self.tier
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn keyboard_history(&self) -> &RollingHistory {
        &self.histories.keyboard
    }

    pub fn mouse_history(&self) -> &RollingHistory {
        &self.histories.mouse
    }

    pub fn combined_history(&self) -> &RollingHistory {
        &self.histories.combined
    }
}
