//! Activity session orchestration
//!
//! A session owns one classifier, one input counter, and the sending half of
//! an output channel supplied by the caller. Events are dispatched by kind:
//! inputs are counted, rate samples are classified, and one-shot events are
//! forwarded unchanged.

use std::sync::mpsc::Sender;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::classifier::ActivityTierClassifier;
use crate::config::SessionConfig;
use crate::counter::ActivityCounter;
use crate::error::ComputeError;
use crate::types::{ActivityEvent, RateSample, SessionOutput, TierSnapshot};

/// Stateful monitoring session
#[derive(Debug)]
pub struct ActivitySession {
    id: String,
    classifier: ActivityTierClassifier,
    counter: ActivityCounter,
    outputs: Sender<SessionOutput>,
}

impl ActivitySession {
    /// Create a session from a validated config
    pub fn new(config: &SessionConfig, outputs: Sender<SessionOutput>) -> Result<Self, ComputeError> {
        config.validate()?;
        let classifier = ActivityTierClassifier::new(config.threshold_table()?);
        let counter = ActivityCounter::new(config.sample_interval(), config.window_ticks);
        let id = Uuid::new_v4().to_string();
        debug!(session_id = %id, tiers = classifier.thresholds().tier_count(), "activity session started");

        Ok(Self {
            id,
            classifier,
            counter,
            outputs,
        })
    }

    /// Route one event
    pub fn dispatch(&mut self, event: ActivityEvent) -> Result<(), ComputeError> {
        match event {
            ActivityEvent::Input { kind } => {
                self.counter.record(kind);
                Ok(())
            }
            ActivityEvent::Rate(sample) => self.record_sample(sample),
            ActivityEvent::OneOff { kind } => self.send(SessionOutput::OneOff { kind }),
        }
    }

    /// Close one sampling interval: turn counted input into a rate sample and
    /// classify it. Returns the sample that was recorded.
    pub fn tick(&mut self) -> Result<RateSample, ComputeError> {
        let sample = self.counter.tick();
        self.record_sample(sample)?;
        Ok(sample)
    }

    /// Emit a snapshot of the current classification and return it
    pub fn report(&self) -> Result<TierSnapshot, ComputeError> {
        let snapshot = self.snapshot();
        self.send(SessionOutput::Report(snapshot.clone()))?;
        Ok(snapshot)
    }

    /// Current classification without emitting anything
    pub fn snapshot(&self) -> TierSnapshot {
        TierSnapshot {
            session_id: self.id.clone(),
            observed_at: Utc::now(),
            smoothed_rate: self.classifier.current_smoothed_rate(),
            tier: self.classifier.current_tier(),
            tier_count: self.classifier.thresholds().tier_count(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn classifier(&self) -> &ActivityTierClassifier {
        &self.classifier
    }

    fn record_sample(&mut self, sample: RateSample) -> Result<(), ComputeError> {
        let before = self.classifier.current_tier();
        self.classifier.record_sample(sample);
        let after = self.classifier.current_tier();

        if before != after {
            self.send(SessionOutput::TierChanged {
                from: before,
                to: after,
                smoothed_rate: self.classifier.current_smoothed_rate(),
            })?;
        }
        Ok(())
    }

    fn send(&self, output: SessionOutput) -> Result<(), ComputeError> {
        self.outputs
            .send(output)
            .map_err(|_| ComputeError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InputKind, OneOffKind};
    use pretty_assertions::assert_eq;
    use std::sync::mpsc::{channel, Receiver};

    fn session() -> (ActivitySession, Receiver<SessionOutput>) {
        let (tx, rx) = channel();
        let session = ActivitySession::new(&SessionConfig::default(), tx).unwrap();
        (session, rx)
    }

    #[test]
    fn test_rate_events_classify_and_notify() {
        let (mut session, rx) = session();

        session
            .dispatch(ActivityEvent::Rate(RateSample::new(0.0, 0.0)))
            .unwrap();
        assert!(rx.try_recv().is_err());

        session
            .dispatch(ActivityEvent::Rate(RateSample::new(1200.0, 900.0)))
            .unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionOutput::TierChanged {
                from: 0,
                to: 3,
                smoothed_rate: 700
            }
        );
        assert_eq!(session.classifier().current_tier(), 3);
    }

    #[test]
    fn test_unchanged_tier_is_silent() {
        let (mut session, rx) = session();
        for _ in 0..5 {
            session
                .dispatch(ActivityEvent::Rate(RateSample::new(10.0, 10.0)))
                .unwrap();
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_one_off_forwarded() {
        let (mut session, rx) = session();
        session
            .dispatch(ActivityEvent::OneOff {
                kind: OneOffKind::Copy,
            })
            .unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionOutput::OneOff {
                kind: OneOffKind::Copy
            }
        );
    }

    #[test]
    fn test_tick_converts_counted_input() {
        let (mut session, rx) = session();
        // 4 keys per second = 240 per minute, 2 samples -> (0 + 240) / 2 = 120
        for _ in 0..4 {
            session
                .dispatch(ActivityEvent::Input {
                    kind: InputKind::Keyboard,
                })
                .unwrap();
        }

        let sample = session.tick().unwrap();
        assert_eq!(sample, RateSample::new(240.0, 0.0));
        assert_eq!(session.classifier().current_smoothed_rate(), 120);
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionOutput::TierChanged {
                from: 0,
                to: 1,
                smoothed_rate: 120
            }
        );
    }

    #[test]
    fn test_report_emits_snapshot() {
        let (session, rx) = session();
        let snapshot = session.report().unwrap();

        assert_eq!(snapshot.session_id, session.id());
        assert_eq!(snapshot.tier, 0);
        assert_eq!(snapshot.tier_count, 6);
        assert_eq!(rx.try_recv().unwrap(), SessionOutput::Report(snapshot));
    }

    #[test]
    fn test_closed_channel_is_an_error() {
        let (mut session, rx) = session();
        drop(rx);

        // Counting never touches the channel
        session
            .dispatch(ActivityEvent::Input {
                kind: InputKind::Mouse,
            })
            .unwrap();

        let err = session
            .dispatch(ActivityEvent::OneOff {
                kind: OneOffKind::Scroll,
            })
            .unwrap_err();
        assert!(matches!(err, ComputeError::ChannelClosed));
    }

    #[test]
    fn test_sessions_are_independent() {
        let (mut a, _rx_a) = session();
        let (b, _rx_b) = session();

        a.dispatch(ActivityEvent::Rate(RateSample::new(5000.0, 0.0)))
            .unwrap();
        assert_eq!(a.classifier().current_tier(), 5);
        assert_eq!(b.classifier().current_tier(), 0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let (tx, _rx) = channel();
        let config = SessionConfig {
            thresholds: vec![3.0, 1.0],
            ..SessionConfig::default()
        };
        assert!(ActivitySession::new(&config, tx).is_err());
    }
}
