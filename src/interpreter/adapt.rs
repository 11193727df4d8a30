//! Bounded Online Adaptation
//!
//! Gently re-centers the committed index hysteresis thresholds around the
//! user's observed rest pinch strength, at a rate capped low enough that it
//! cannot be mistaken for a deliberate gesture.

use crate::config::AdaptationBounds;

const MIN_INTERVAL_MS: u64 = 5_000;

pub struct Adapter {
    bounds: AdaptationBounds,
    last_adapt_ms: Option<u64>,
}

impl Adapter {
    pub fn new(bounds: AdaptationBounds) -> Self {
        Self { bounds, last_adapt_ms: None }
    }

    /// Given the current thresholds and an observed calm rest strength,
    /// returns the adjusted `(p_on, p_off)` if an adaptation step is due.
    pub fn maybe_adapt(&mut self, p_on: f32, p_off: f32, rest: f32, t_ms: u64) -> Option<(f32, f32)> {
        let dt = match self.last_adapt_ms {
            Some(last) => t_ms.saturating_sub(last),
            None => {
                self.last_adapt_ms = Some(t_ms);
                return None;
            }
        };
        if dt < MIN_INTERVAL_MS {
            return None;
        }
        self.last_adapt_ms = Some(t_ms);

        let center = (p_on + p_off) / 2.0;
        let direction = (rest - center).signum();
        if direction == 0.0 {
            return None;
        }
        let shift = self.bounds.max_shift_per_min * (dt as f32 / 60_000.0);

        let new_on = (p_on + direction * shift).clamp(self.bounds.p_on_range.0, self.bounds.p_on_range.1);
        let new_off = (p_off + direction * shift).clamp(self.bounds.p_off_range.0, self.bounds.p_off_range.1);
        Some((new_on, new_off))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> AdaptationBounds {
        AdaptationBounds {
            p_on_range: (0.70, 0.90),
            p_off_range: (0.50, 0.75),
            max_shift_per_min: 0.01,
            max_hand_speed_norm: 0.015,
        }
    }

    #[test]
    fn first_call_only_seeds_the_clock() {
        let mut a = Adapter::new(bounds());
        assert_eq!(a.maybe_adapt(0.78, 0.62, 0.85, 0), None);
    }

    #[test]
    fn does_not_adapt_before_minimum_interval() {
        let mut a = Adapter::new(bounds());
        a.maybe_adapt(0.78, 0.62, 0.85, 0);
        assert_eq!(a.maybe_adapt(0.78, 0.62, 0.85, 2000), None);
    }

    #[test]
    fn drift_stays_within_configured_ranges() {
        let mut a = Adapter::new(bounds());
        a.maybe_adapt(0.78, 0.62, 0.95, 0);
        let (p_on, p_off) = a.maybe_adapt(0.78, 0.62, 0.95, 5_000).unwrap();
        assert!(p_on <= bounds().p_on_range.1 && p_on >= bounds().p_on_range.0);
        assert!(p_off <= bounds().p_off_range.1 && p_off >= bounds().p_off_range.0);
        assert!(p_on > 0.78);
    }
}
