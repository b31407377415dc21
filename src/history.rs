//! Bounded rolling histories of activity rates
//!
//! Each history is a FIFO capped at [`HISTORY_CAPACITY`] entries and seeded with
//! a single zero so the first average over it is always defined.

use std::collections::VecDeque;

/// Maximum number of entries kept per history
pub const HISTORY_CAPACITY: usize = 10;

/// Number of most-recent combined entries averaged into the smoothed rate
pub const SMOOTHING_WINDOW: usize = 5;

/// A single bounded, seeded FIFO of rates
#[derive(Debug, Clone, PartialEq)]
pub struct RollingHistory {
    values: VecDeque<f64>,
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingHistory {
    /// Create a history holding only the zero seed
    pub fn new() -> Self {
        let mut values = VecDeque::with_capacity(HISTORY_CAPACITY);
        values.push_back(0.0);
        Self { values }
    }

    /// Append a value, evicting the oldest entry first when at capacity
    pub fn push(&mut self, value: f64) {
        if self.values.len() >= HISTORY_CAPACITY {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Truncated mean of the most recent `window` entries (at least one entry
    /// is always present, so the divisor is never zero for `window >= 1`)
    pub fn recent_mean(&self, window: usize) -> i64 {
        let take = window.max(1).min(self.values.len());
        let sum: f64 = self.values.iter().rev().take(take).sum();
        (sum / take as f64).trunc() as i64
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Oldest entry
    pub fn oldest(&self) -> Option<f64> {
        self.values.front().copied()
    }

    /// Newest entry
    pub fn newest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Iterate oldest-first
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

/// The keyboard, mouse, and combined histories advanced together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateHistories {
    pub keyboard: RollingHistory,
    pub mouse: RollingHistory,
    pub combined: RollingHistory,
}

impl RateHistories {
    /// Push one keyboard/mouse pair into all three histories
    pub fn push(&mut self, keyboard_rate: f64, mouse_rate: f64) {
        self.keyboard.push(keyboard_rate);
        self.mouse.push(mouse_rate);
        self.combined.push(keyboard_rate + mouse_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_zero() {
        let history = RollingHistory::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.oldest(), Some(0.0));
        assert_eq!(history.recent_mean(SMOOTHING_WINDOW), 0);
    }

    #[test]
    fn test_capacity_and_fifo_eviction() {
        let mut history = RollingHistory::new();

        for i in 1..=25 {
            history.push(i as f64);
            assert!(history.len() <= HISTORY_CAPACITY);
        }

        // 16..=25 survive, seed and early values evicted first
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.oldest(), Some(16.0));
        assert_eq!(history.newest(), Some(25.0));
        let kept: Vec<f64> = history.iter().collect();
        assert_eq!(kept, (16..=25).map(|v| v as f64).collect::<Vec<_>>());
    }

    #[test]
    fn test_seed_evicted_on_tenth_push() {
        let mut history = RollingHistory::new();
        for _ in 0..9 {
            history.push(7.0);
        }
        assert_eq!(history.oldest(), Some(0.0));

        history.push(7.0);
        assert_eq!(history.oldest(), Some(7.0));
    }

    #[test]
    fn test_recent_mean_truncates() {
        let mut history = RollingHistory::new();
        history.push(10.0);
        history.push(11.0);
        // (0 + 10 + 11) / 3 = 7.0
        assert_eq!(history.recent_mean(5), 7);

        history.push(2.0);
        // (0 + 10 + 11 + 2) / 4 = 5.75
        assert_eq!(history.recent_mean(5), 5);
    }

    #[test]
    fn test_recent_mean_uses_latest_window_only() {
        let mut history = RollingHistory::new();
        for v in [1000.0, 1000.0, 1.0, 2.0, 3.0, 4.0, 5.0] {
            history.push(v);
        }
        assert_eq!(history.recent_mean(5), 3);
    }

    #[test]
    fn test_histories_advance_together() {
        let mut histories = RateHistories::default();
        histories.push(30.0, 12.0);

        assert_eq!(histories.keyboard.newest(), Some(30.0));
        assert_eq!(histories.mouse.newest(), Some(12.0));
        assert_eq!(histories.combined.newest(), Some(42.0));
        assert_eq!(histories.combined.len(), 2);
    }
}
