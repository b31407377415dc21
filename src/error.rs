//! Error types for beats-tier

use thiserror::Error;

/// Errors that can occur at the edges of the classifier (input parsing,
/// configuration, output channels). Classification itself never fails.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse activity input: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid threshold table: {0}")]
    InvalidThresholds(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Session output channel is closed")]
    ChannelClosed,
}
