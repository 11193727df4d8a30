//! Hover Mapping (Idle Motion)
//!
//! Unlike the contact mapper, hover filters *deltas* rather than absolute
//! position, so it tracks raw hand motion frame to frame instead of relative
//! to a frozen anchor.

use crate::config::{HoverTuning, MovementSafety};
use crate::filters::{OneEuro, OneEuroParams};

const HARDWARE_DEADZONE_PX: f32 = 2.0;

pub struct HoverMapper {
    cfg: HoverTuning,
    safety: MovementSafety,
    filter_dx: OneEuro,
    filter_dy: OneEuro,
    prev: Option<(f32, f32)>,
}

impl HoverMapper {
    pub fn new(cfg: HoverTuning, safety: MovementSafety) -> Self {
        let params = OneEuroParams { min_cutoff_hz: 2.2, beta: 0.06, d_cutoff_hz: 1.0 };
        Self { cfg, safety, filter_dx: OneEuro::new(params), filter_dy: OneEuro::new(params), prev: None }
    }

    pub fn reset(&mut self) {
        self.prev = None;
        self.filter_dx.reset();
        self.filter_dy.reset();
    }

    /// Whether the hand position is inside the hover safe zone (away from the
    /// camera's field-of-view edges, where tracking degrades).
    pub fn in_safe_zone(&self, pos: (f32, f32)) -> bool {
        let m = self.cfg.edge_margin;
        pos.0 >= m && pos.0 <= 1.0 - m && pos.1 >= m && pos.1 <= 1.0 - m
    }

    /// Map raw hand position to a pixel delta using frame-to-frame deltas.
    /// Returns `None` when no motion should be emitted this frame.
    pub fn step(&mut self, pos: (f32, f32), screen: (f32, f32), t_ms: u64) -> Option<(i32, i32)> {
        let prev = match self.prev {
            Some(p) => p,
            None => {
                self.prev = Some(pos);
                return None;
            }
        };

        let raw_dx = (pos.0 - prev.0) * screen.0 * self.cfg.sensitivity;
        let raw_dy = (pos.1 - prev.1) * screen.1 * self.cfg.sensitivity;
        self.prev = Some(pos);

        let t = t_ms as f32 / 1000.0;
        let mut dx = self.filter_dx.filter(raw_dx, t);
        let mut dy = self.filter_dy.filter(raw_dy, t);

        let speed = dx.abs() + dy.abs();
        let adaptive_deadzone = if speed > 8.0 { 2.0 } else { 4.0 };
        let deadzone = (self.cfg.deadzone_px as f32).max(HARDWARE_DEADZONE_PX).max(adaptive_deadzone);

        if dx.abs() < deadzone {
            dx = 0.0;
        }
        if dy.abs() < deadzone {
            dy = 0.0;
        }

        let max_x = self.safety.max_step_frac * screen.0;
        let max_y = self.safety.max_step_frac * screen.1;
        dx = dx.clamp(-max_x, max_x);
        dy = dy.clamp(-max_y, max_y);

        if dx.abs() <= 1.0 && dy.abs() <= 1.0 {
            return None;
        }

        Some((dx.round() as i32, dy.round() as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> HoverTuning {
        HoverTuning { enabled: true, min_conf: 0.75, edge_margin: 0.06, deadzone_px: 4, sensitivity: 2.2 }
    }

    fn safety() -> MovementSafety {
        MovementSafety { deadzone_px: 1, max_step_frac: 0.20 }
    }

    #[test]
    fn first_sample_only_seeds_previous_position() {
        let mut h = HoverMapper::new(cfg(), safety());
        assert_eq!(h.step((0.5, 0.5), (1920.0, 1080.0), 0), None);
    }

    #[test]
    fn small_jitter_is_absorbed_by_deadzone() {
        let mut h = HoverMapper::new(cfg(), safety());
        h.step((0.5, 0.5), (1920.0, 1080.0), 0);
        assert_eq!(h.step((0.5001, 0.5), (1920.0, 1080.0), 16), None);
    }

    #[test]
    fn edge_margin_excludes_frame_border() {
        let h = HoverMapper::new(cfg(), safety());
        assert!(!h.in_safe_zone((0.02, 0.5)));
        assert!(h.in_safe_zone((0.5, 0.5)));
    }

    #[test]
    fn large_jump_is_clamped_to_the_step_cap() {
        let mut h = HoverMapper::new(cfg(), safety());
        h.step((0.5, 0.5), (1920.0, 1080.0), 0);
        let (dx, _dy) = h.step((0.95, 0.5), (1920.0, 1080.0), 300).unwrap();
        let cap = (safety().max_step_frac * 1920.0).round() as i32;
        assert!(dx <= cap);
    }
}
