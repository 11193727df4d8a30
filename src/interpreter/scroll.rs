//! Displacement-Based Scroll Engine
//!
//! Scrolling is anchored to the hand's vertical position at entry; moving
//! away from the anchor past a deadzone produces wheel ticks, with a clutch
//! that lets the anchor creep toward the hand on long drags and a sticky
//! hold that tolerates brief pinch dropouts.

use crate::config::ScrollPhysics;

const PX_PER_TICK: f32 = 26.0;
const MAX_TICKS_PER_FRAME: i32 = 6;
const CLUTCH_PX: f32 = 260.0;
const MIN_DEADZONE_PX: f32 = 10.0;

pub struct ScrollEngine {
    physics: ScrollPhysics,
    conf_recog: f32,
    anchor_y: f32,
    remainder: f32,
}

impl ScrollEngine {
    pub fn new(physics: ScrollPhysics, conf_recog: f32) -> Self {
        Self { physics, conf_recog, anchor_y: 0.5, remainder: 0.0 }
    }

    pub fn enter(&mut self, hand_y: f32) {
        self.anchor_y = hand_y;
        self.remainder = 0.0;
    }

    fn conf_activity_floor(&self) -> f32 {
        (self.conf_recog - 0.10).max(0.40)
    }

    /// Compute this frame's wheel ticks, or `None` to emit nothing.
    pub fn tick(&mut self, hand_y: f32, confidence: f32, screen_h: f32) -> Option<i32> {
        if confidence < self.conf_activity_floor() {
            return None;
        }

        let mut offset_px = (hand_y - self.anchor_y) * screen_h;

        if offset_px.abs() > CLUTCH_PX {
            let excess = (offset_px.abs() - CLUTCH_PX) / screen_h;
            self.anchor_y += excess * offset_px.signum();
            offset_px = (hand_y - self.anchor_y) * screen_h;
        }

        let mut sign = -offset_px.signum();
        if self.physics.invert_y {
            sign = -sign;
        }

        let deadzone = self.physics.deadzone_px.max(MIN_DEADZONE_PX);
        if offset_px.abs() <= deadzone {
            return None;
        }

        let delta_ticks = sign * (offset_px.abs() - deadzone) / PX_PER_TICK;
        self.remainder += delta_ticks;

        let ticks = self.remainder.trunc().clamp(-MAX_TICKS_PER_FRAME as f32, MAX_TICKS_PER_FRAME as f32);
        self.remainder -= ticks;

        if ticks == 0.0 {
            None
        } else {
            Some(ticks as i32)
        }
    }

    pub fn reset(&mut self) {
        self.remainder = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> ScrollPhysics {
        ScrollPhysics {
            deadzone_px: 14.0,
            px_for_unit: 140.0,
            gamma: 1.35,
            max_ticks_per_s: 320.0,
            half_life_ms: 320,
            reengage_ms: 420,
            invert_y: false,
        }
    }

    #[test]
    fn no_displacement_emits_no_ticks() {
        let mut s = ScrollEngine::new(physics(), 0.7);
        s.enter(0.5);
        assert_eq!(s.tick(0.5, 0.9, 1080.0), None);
    }

    #[test]
    fn low_confidence_suppresses_ticks() {
        let mut s = ScrollEngine::new(physics(), 0.7);
        s.enter(0.5);
        assert_eq!(s.tick(0.7, 0.1, 1080.0), None);
    }

    #[test]
    fn pulling_hand_down_scrolls_forward() {
        let mut s = ScrollEngine::new(physics(), 0.7);
        s.enter(0.5);
        let ticks = s.tick(0.65, 0.9, 1080.0);
        assert!(ticks.is_some());
        assert!(ticks.unwrap() > 0);
    }

    #[test]
    fn ticks_are_capped_per_frame() {
        let mut s = ScrollEngine::new(physics(), 0.7);
        s.enter(0.0);
        let ticks = s.tick(1.0, 0.9, 1080.0).unwrap_or(0);
        assert!(ticks.abs() <= MAX_TICKS_PER_FRAME);
    }
}
