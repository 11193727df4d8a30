//! Anchor-Relative Pointer Mapping
//!
//! Used while latched (CONTACT/DRAG/SCROLL/DRAG_SCROLL share the same cursor):
//! the hand position and cursor position are frozen at contact entry, and
//! subsequent motion is mapped relative to that anchor through a One-Euro
//! filter per axis.

use crate::config::{MovementSafety, OneEuroParams as OneEuroCfg};
use crate::filters::{OneEuro, OneEuroParams};

const SETTLE_MS: u64 = 60;

pub struct PointerMapper {
    filter_x: OneEuro,
    filter_y: OneEuro,
    anchor_hand: (f32, f32),
    anchor_cursor: (f32, f32),
    cursor: (f32, f32),
    sensitivity: f32,
    safety: MovementSafety,
    settle_until_ms: u64,
}

impl PointerMapper {
    pub fn new(filter_cfg: OneEuroCfg, sensitivity: f32, safety: MovementSafety) -> Self {
        let params = OneEuroParams {
            min_cutoff_hz: filter_cfg.min_cutoff_hz,
            beta: filter_cfg.beta,
            d_cutoff_hz: filter_cfg.d_cutoff_hz,
        };
        Self {
            filter_x: OneEuro::new(params),
            filter_y: OneEuro::new(params),
            anchor_hand: (0.5, 0.5),
            anchor_cursor: (0.0, 0.0),
            cursor: (0.0, 0.0),
            sensitivity,
            safety,
            settle_until_ms: 0,
        }
    }

    /// Freeze the anchor at the hand's current position and the live cursor.
    pub fn enter(&mut self, hand_pos: (f32, f32), t_ms: u64) {
        self.filter_x.reset();
        self.filter_y.reset();
        self.anchor_hand = hand_pos;
        self.anchor_cursor = self.cursor;
        self.settle_until_ms = t_ms + SETTLE_MS;
    }

    /// Map a frame's hand position to a pixel step, updating internal cursor
    /// state. Returns `None` if the step falls inside the deadzone.
    pub fn step(&mut self, hand_pos: (f32, f32), screen: (f32, f32), t_ms: u64) -> Option<(i32, i32)> {
        let fx = self.filter_x.filter(hand_pos.0, t_ms as f32 / 1000.0);
        let fy = self.filter_y.filter(hand_pos.1, t_ms as f32 / 1000.0);

        if t_ms < self.settle_until_ms {
            return None;
        }

        let target_x = self.anchor_cursor.0 + (fx - self.anchor_hand.0) * screen.0 * self.sensitivity;
        let target_y = self.anchor_cursor.1 + (fy - self.anchor_hand.1) * screen.1 * self.sensitivity;

        let mut step_x = (target_x - self.cursor.0).round();
        let mut step_y = (target_y - self.cursor.1).round();

        let deadzone = self.safety.deadzone_px.max(2) as f32;
        if step_x.abs() <= deadzone && step_y.abs() <= deadzone {
            return None;
        }

        let max_x = self.safety.max_step_frac * screen.0;
        let max_y = self.safety.max_step_frac * screen.1;
        step_x = step_x.clamp(-max_x, max_x);
        step_y = step_y.clamp(-max_y, max_y);

        self.cursor.0 += step_x;
        self.cursor.1 += step_y;

        Some((step_x as i32, step_y as i32))
    }

    pub fn reset(&mut self) {
        self.filter_x.reset();
        self.filter_y.reset();
        self.settle_until_ms = 0;
    }

    /// Timestamp up to which motion is suppressed after the last `enter`.
    /// Scroll entry is gated on this so a click's settle window can't be
    /// read as hand stillness and immediately re-armed into a scroll.
    pub fn settle_until_ms(&self) -> u64 {
        self.settle_until_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> PointerMapper {
        PointerMapper::new(
            OneEuroCfg { min_cutoff_hz: 2.0, beta: 0.06, d_cutoff_hz: 1.0 },
            2.5,
            MovementSafety { deadzone_px: 1, max_step_frac: 0.20 },
        )
    }

    #[test]
    fn no_motion_produces_no_step() {
        let mut m = mapper();
        m.enter((0.5, 0.5), 0);
        assert_eq!(m.step((0.5, 0.5), (1920.0, 1080.0), 100), None);
    }

    #[test]
    fn settle_window_suppresses_immediate_motion() {
        let mut m = mapper();
        m.enter((0.5, 0.5), 0);
        assert_eq!(m.step((0.6, 0.5), (1920.0, 1080.0), 10), None);
    }

    #[test]
    fn motion_after_settle_produces_a_step_towards_target() {
        let mut m = mapper();
        m.enter((0.5, 0.5), 0);
        let step = m.step((0.6, 0.5), (1920.0, 1080.0), 200);
        assert!(step.is_some());
        assert!(step.unwrap().0 > 0);
    }
}
