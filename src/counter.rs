//! Raw input counting
//!
//! Accumulates keyboard and mouse actions and converts them into per-minute
//! rates once per sampling interval. Counts accumulate across a window of
//! several ticks so that a single quiet interval does not zero the rate.

use std::time::Duration;

use tracing::debug;

use crate::types::{InputKind, RateSample};

/// Default sampling interval (one tick per second)
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Default number of ticks before counts reset
pub const DEFAULT_WINDOW_TICKS: u32 = 10;

/// Converts raw action counts into [`RateSample`]s
#[derive(Debug, Clone)]
pub struct ActivityCounter {
    sample_interval: Duration,
    window_ticks: u32,
    keyboard_actions: u64,
    mouse_actions: u64,
    elapsed: Duration,
    ticks_in_window: u32,
}

impl Default for ActivityCounter {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL, DEFAULT_WINDOW_TICKS)
    }
}

impl ActivityCounter {
    /// Create a counter. A `window_ticks` of zero is treated as one.
    pub fn new(sample_interval: Duration, window_ticks: u32) -> Self {
        Self {
            sample_interval,
            window_ticks: window_ticks.max(1),
            keyboard_actions: 0,
            mouse_actions: 0,
            elapsed: Duration::ZERO,
            ticks_in_window: 0,
        }
    }

    /// Count one action
    pub fn record(&mut self, kind: InputKind) {
        match kind {
            InputKind::Keyboard => self.keyboard_actions += 1,
            InputKind::Mouse => self.mouse_actions += 1,
        }
    }

    /// Close one sampling interval and return the window's rates.
    ///
    /// Rates are truncated toward zero. The window resets after the tick that
    /// completes it.
    pub fn tick(&mut self) -> RateSample {
        self.elapsed += self.sample_interval;
        self.ticks_in_window += 1;

        let minutes = self.elapsed.as_secs_f64() / 60.0;
        let sample = if minutes > 0.0 {
            RateSample::new(
                (self.keyboard_actions as f64 / minutes).trunc(),
                (self.mouse_actions as f64 / minutes).trunc(),
            )
        } else {
            RateSample::default()
        };

        if self.ticks_in_window >= self.window_ticks {
            debug!(
                keyboard_actions = self.keyboard_actions,
                mouse_actions = self.mouse_actions,
                elapsed_ms = self.elapsed.as_millis() as u64,
                "activity window reset"
            );
            self.reset();
        }

        sample
    }

    /// Drop all counts and start a new window
    pub fn reset(&mut self) {
        self.keyboard_actions = 0;
        self.mouse_actions = 0;
        self.elapsed = Duration::ZERO;
        self.ticks_in_window = 0;
    }

    pub fn keyboard_actions(&self) -> u64 {
        self.keyboard_actions
    }

    pub fn mouse_actions(&self) -> u64 {
        self.mouse_actions
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }
}
