//! Debounced Hysteresis Gate
//!
//! Turns a noisy `[0, 1]` signal into a stable boolean, requiring the signal
//! to sit past its on/off threshold for a minimum dwell time before the gate
//! actually flips.

use crate::config::Hysteresis;

#[derive(Debug, Clone, Copy)]
pub struct DebouncedHysteresis {
    cfg: Hysteresis,
    state: bool,
    candidate: Option<bool>,
    candidate_since_ms: u64,
    /// Timestamp the gate last flipped `false -> true`, `None` while off.
    on_since_ms: Option<u64>,
}

impl DebouncedHysteresis {
    pub fn new(cfg: Hysteresis) -> Self {
        Self { cfg, state: false, candidate: None, candidate_since_ms: 0, on_since_ms: None }
    }

    pub fn set_thresholds(&mut self, p_on: f32, p_off: f32) {
        self.cfg.p_on = p_on;
        self.cfg.p_off = p_off;
    }

    pub fn p_on(&self) -> f32 {
        self.cfg.p_on
    }

    pub fn p_off(&self) -> f32 {
        self.cfg.p_off
    }

    pub fn is_on(&self) -> bool {
        self.state
    }

    /// Milliseconds since this gate last committed to `on`, if it currently is.
    pub fn on_since_ms(&self) -> Option<u64> {
        self.on_since_ms
    }

    /// Feed a new raw value and timestamp; returns the committed boolean state.
    pub fn update(&mut self, value: f32, t_ms: u64) -> bool {
        let target = if self.state {
            if value <= self.cfg.p_off { false } else { self.state }
        } else if value >= self.cfg.p_on {
            true
        } else {
            self.state
        };

        if target == self.state {
            self.candidate = None;
            return self.state;
        }

        if self.candidate != Some(target) {
            self.candidate = Some(target);
            self.candidate_since_ms = t_ms;
        }

        let dwell = if target { self.cfg.t_on_ms } else { self.cfg.t_off_ms };
        if t_ms.saturating_sub(self.candidate_since_ms) >= dwell {
            self.state = target;
            self.candidate = None;
            self.on_since_ms = if target { Some(t_ms) } else { None };
        }

        self.state
    }

    pub fn reset(&mut self) {
        self.state = false;
        self.candidate = None;
        self.on_since_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> DebouncedHysteresis {
        DebouncedHysteresis::new(Hysteresis { p_on: 0.7, p_off: 0.5, t_on_ms: 50, t_off_ms: 50 })
    }

    #[test]
    fn does_not_commit_before_dwell_elapses() {
        let mut g = gate();
        assert!(!g.update(0.9, 0));
        assert!(!g.update(0.9, 20));
        assert!(g.update(0.9, 60));
    }

    #[test]
    fn brief_dip_below_threshold_cancels_the_candidate() {
        let mut g = gate();
        g.update(0.9, 0);
        g.update(0.6, 10);
        assert!(!g.update(0.9, 20));
        assert!(g.update(0.9, 71));
    }

    #[test]
    fn off_threshold_is_independent_of_on_threshold() {
        let mut g = gate();
        g.update(0.9, 0);
        g.update(0.9, 60);
        assert!(g.is_on());
        assert!(g.update(0.6, 61));
        assert!(g.update(0.55, 100));
        assert!(!g.update(0.4, 150));
    }
}
