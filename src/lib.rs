//! beats-tier - Activity-tier classifier for BrowserBeats
//!
//! Converts periodic keyboard and mouse activity rates into a smoothed combined
//! rate and a discrete engagement tier: input counting → rolling histories →
//! moving average → threshold classification.
//!
//! ## Modules
//!
//! - **Classifier**: rolling histories and tier computation
//! - **Session**: typed event dispatch around one classifier and an output channel

pub mod classifier;
pub mod config;
pub mod counter;
pub mod error;
pub mod history;
pub mod session;
pub mod thresholds;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::ActivityTierClassifier;
pub use config::SessionConfig;
pub use counter::ActivityCounter;
pub use error::ComputeError;
pub use session::ActivitySession;
pub use thresholds::ThresholdTable;
pub use types::{ActivityEvent, InputKind, OneOffKind, RateSample, SessionOutput, TierSnapshot};

/// Crate version reported by the CLI and FFI
pub const BEATS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name used in CLI reports
pub const PRODUCER_NAME: &str = "beats-tier";
