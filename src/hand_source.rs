//! Hand-Tracking Source
//!
//! The sensor front-end that produces `HandFrame`s is an external
//! collaborator; this crate only defines the trait boundary and a
//! deterministic stand-in used by demos, examples, and tests.

use crate::types::{HandFrame, HandObservation, Handedness, PinchSignals};

/// Produces one `HandFrame` per poll. A real implementation wraps a camera
/// and a hand-landmark model; it is not provided here.
pub trait HandSource {
    fn poll(&mut self, t_ms: u64) -> HandFrame;
}

/// A scripted hand-tracking source: replays a fixed sequence of observations,
/// holding the last one once exhausted. Useful for demos and integration
/// tests that need a deterministic stream without a camera.
pub struct FakeHandSource {
    script: Vec<HandObservation>,
    index: usize,
}

impl FakeHandSource {
    pub fn new(script: Vec<HandObservation>) -> Self {
        Self { script, index: 0 }
    }

    /// A steady hand sitting at rest in the middle of the frame, useful as a
    /// starting point for building a script.
    pub fn resting_hand() -> HandObservation {
        HandObservation {
            hand_id: 1,
            present: true,
            confidence: 0.95,
            handedness: Handedness::Right,
            pos_norm: (0.5, 0.5, 0.0),
            pinch: PinchSignals { index: 0.1, middle: 0.1, ring: 0.1 },
        }
    }
}

impl HandSource for FakeHandSource {
    fn poll(&mut self, t_ms: u64) -> HandFrame {
        let hand = self
            .script
            .get(self.index)
            .cloned()
            .or_else(|| self.script.last().cloned())
            .unwrap_or_else(HandObservation::absent);

        if self.index < self.script.len() {
            self.index += 1;
        }

        HandFrame { t_ms, hands: vec![hand] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_script_then_holds_last_observation() {
        let mut a = FakeHandSource::resting_hand();
        a.pinch.index = 0.9;
        let mut source = FakeHandSource::new(vec![FakeHandSource::resting_hand(), a.clone()]);
        let f0 = source.poll(0);
        assert_eq!(f0.hands[0].pinch.index, 0.1);
        let f1 = source.poll(16);
        assert_eq!(f1.hands[0].pinch.index, 0.9);
        let f2 = source.poll(32);
        assert_eq!(f2.hands[0].pinch.index, 0.9);
    }
}
