//! Activity data types
//!
//! Samples, events, and outputs that flow between input capture, the tier
//! classifier, and whatever consumes tiers (audio mixer, UI).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keyboard and mouse activity over one sampling window, in actions per minute
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateSample {
    /// Keyboard actions per minute
    #[serde(alias = "kAPM")]
    pub keyboard_rate: f64,
    /// Mouse actions per minute
    #[serde(alias = "mAPM")]
    pub mouse_rate: f64,
}

impl RateSample {
    pub fn new(keyboard_rate: f64, mouse_rate: f64) -> Self {
        Self {
            keyboard_rate,
            mouse_rate,
        }
    }

    /// Keyboard plus mouse rate
    pub fn combined(&self) -> f64 {
        self.keyboard_rate + self.mouse_rate
    }
}

/// Raw input that counts toward the activity rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// A key press
    Keyboard,
    /// A mouse click
    Mouse,
}

/// One-shot events that bypass classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OneOffKind {
    Copy,
    Paste,
    Scroll,
}

/// Event delivered to an activity session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    /// A single keyboard or mouse action to be counted
    Input { kind: InputKind },
    /// A pre-aggregated rate sample
    Rate(RateSample),
    /// A one-shot event forwarded to the session's consumer
    OneOff { kind: OneOffKind },
}

/// Point-in-time view of a session's classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSnapshot {
    /// Owning session identifier
    pub session_id: String,
    /// When the snapshot was taken
    pub observed_at: DateTime<Utc>,
    /// Truncated moving average of the combined rate
    pub smoothed_rate: i64,
    /// Current tier (0 = lowest)
    pub tier: usize,
    /// Number of tiers the threshold table produces
    pub tier_count: usize,
}

/// Output emitted by an activity session on its channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionOutput {
    /// The tier differs from the one before the latest sample
    TierChanged {
        from: usize,
        to: usize,
        smoothed_rate: i64,
    },
    /// A one-shot event passed through
    OneOff { kind: OneOffKind },
    /// Periodic snapshot
    Report(TierSnapshot),
}
