//! The Gesture Interpreter
//!
//! A single-threaded, synchronous state machine: feed it `HandFrame`s in
//! monotonic order, get back an ordered `InputEvent` stream. Safe to drive
//! at up to 240 Hz; never blocks, sleeps, or performs I/O.

mod adapt;
mod hover;
mod latch;
mod pointer;
mod scroll;

use crate::config::{CalibrationProfile, Preset};
use crate::filters::DebouncedHysteresis;
use crate::types::{Button, ButtonAction, HandFrame, HandObservation, InputEvent, Mode};

use adapt::Adapter;
use hover::HoverMapper;
use latch::PinchLatch;
use pointer::PointerMapper;
use scroll::ScrollEngine;

/// Minimum real elapsed time between a LEFT DOWN and its matching UP, per
/// the output contract in the external interface: the interpreter stamps
/// the release timestamp accordingly, the sink turns it into a sleep.
pub const MIN_PRESS_MS: u64 = 55;
const CHORD_WINDOW_MS: u64 = 140;
const RC_BLOCK_AFTER_CONTACT_MS: u64 = 120;
const RC_BLOCK_AFTER_CHORD_MS: u64 = 180;
const RING_TAP_HOVER_BLOCK_MS: u64 = 120;
const SCROLL_ENTRY_HOVER_BLOCK_MS: u64 = 140;
const SCROLL_STICKY_HOLD_MS: u64 = 150;
const SCROLL_EXIT_HOVER_BLOCK_MS: u64 = 160;

pub struct Interpreter {
    preset: Preset,
    screen: (f32, f32),

    mode: Mode,
    off: bool,
    left_down: bool,

    index_gate: DebouncedHysteresis,
    middle_gate: DebouncedHysteresis,
    ring_gate: DebouncedHysteresis,
    pinch_latch: PinchLatch,

    pointer: PointerMapper,
    hover: HoverMapper,
    scroll: ScrollEngine,
    adapter: Adapter,

    last_t_ms: u64,
    last_valid_t_ms: Option<u64>,
    last_pos: Option<(f32, f32)>,
    contact_down_ms: u64,
    rc_block_until_ms: u64,
    hover_block_until_ms: u64,
    scroll_hold_until_ms: u64,
}

impl Interpreter {
    pub fn new(preset: Preset, screen: (u32, u32), profile: Option<CalibrationProfile>) -> Self {
        let preset = match profile {
            Some(p) => p.apply(preset),
            None => preset,
        };
        let screen = (screen.0 as f32, screen.1 as f32);

        Interpreter {
            index_gate: DebouncedHysteresis::new(preset.index_hysteresis),
            middle_gate: DebouncedHysteresis::new(preset.middle_hysteresis),
            ring_gate: DebouncedHysteresis::new(preset.middle_hysteresis),
            pinch_latch: PinchLatch::new(preset.click_latch.fast_down, preset.click_latch.fast_up),
            pointer: PointerMapper::new(preset.position_filter, preset.sensitivity, preset.move_safety),
            hover: HoverMapper::new(preset.hover, preset.move_safety),
            scroll: ScrollEngine::new(preset.scroll_physics, preset.tracking.conf_recog),
            adapter: Adapter::new(preset.adaptation),
            preset,
            screen,
            mode: Mode::Idle,
            off: false,
            left_down: false,
            last_t_ms: 0,
            last_valid_t_ms: None,
            last_pos: None,
            contact_down_ms: 0,
            rc_block_until_ms: 0,
            hover_block_until_ms: 0,
            scroll_hold_until_ms: 0,
        }
    }

    /// Construct with a calibration profile loaded from the platform config
    /// directory, falling back silently to built-in defaults if none exists
    /// or the file is unreadable.
    pub fn with_profile_from_disk(preset: Preset, screen: (u32, u32)) -> Self {
        let profile = CalibrationProfile::load_or_default();
        Self::new(preset, screen, Some(profile))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn clamp_now(&mut self, t_ms: u64) -> u64 {
        let t_ms = t_ms.max(self.last_t_ms);
        self.last_t_ms = t_ms;
        t_ms
    }

    /// Picks the highest-confidence present hand, first one winning ties
    /// (stable order in `hands`), matching the original's strict-`>` scan.
    fn select_hand(hands: &[HandObservation]) -> Option<&HandObservation> {
        let mut best: Option<&HandObservation> = None;
        for h in hands.iter().filter(|h| h.present) {
            match best {
                Some(b) if h.confidence <= b.confidence => {}
                _ => best = Some(h),
            }
        }
        best
    }

    /// Toggle the global kill switch. Honored instantly: any held LEFT is
    /// released (with the minimum-press rule respected) and all latches and
    /// anchors are cleared.
    pub fn set_off(&mut self, off: bool, t_ms: u64) -> Vec<InputEvent> {
        let t_ms = self.clamp_now(t_ms);
        let mut events = Vec::new();
        if off == self.off {
            return events;
        }
        self.off = off;

        if off {
            let mut release_t = t_ms;
            if self.left_down {
                release_t = t_ms.max(self.contact_down_ms + MIN_PRESS_MS);
                events.push(InputEvent::Button { t_ms: release_t, button: Button::Left, action: ButtonAction::Up });
                self.left_down = false;
            }
            self.pinch_latch.force_release();
            self.pointer.reset();
            self.hover.reset();
            self.scroll.reset();
            self.mode = Mode::Off;
            events.push(InputEvent::ModeChanged { t_ms: release_t, mode: Mode::Off });
        } else {
            self.mode = Mode::Idle;
            events.push(InputEvent::ModeChanged { t_ms, mode: Mode::Idle });
        }
        events
    }

    /// Process one frame, returning the ordered events it produced.
    pub fn process(&mut self, frame: HandFrame) -> Vec<InputEvent> {
        let t_ms = self.clamp_now(frame.t_ms);
        let mut events = Vec::new();

        if self.off {
            return events;
        }

        let hand = Self::select_hand(&frame.hands);
        let confidence = hand.map(|h| h.confidence).unwrap_or(0.0);
        let pos = hand.map(|h| (h.pos_norm.0, h.pos_norm.1)).unwrap_or((0.5, 0.5));
        let valid = hand.map(|h| h.confidence >= self.preset.tracking.min_conf).unwrap_or(false);

        let calm = match (hand, self.last_pos) {
            (Some(_), Some(prev)) => {
                let hop = ((pos.0 - prev.0).powi(2) + (pos.1 - prev.1).powi(2)).sqrt();
                hop <= self.preset.adaptation.max_hand_speed_norm
            }
            _ => true,
        };
        if hand.is_some() {
            self.last_pos = Some(pos);
        }

        let raw_index = hand.map(|h| h.pinch.index).unwrap_or(0.0);
        let raw_middle = hand.map(|h| h.pinch.middle).unwrap_or(0.0);
        let raw_ring = hand.map(|h| h.pinch.ring).unwrap_or(0.0);

        let index_committed = self.index_gate.update(raw_index, t_ms);
        let middle_committed = self.middle_gate.update(raw_middle, t_ms);
        let ring_committed = self.ring_gate.update(raw_ring, t_ms);

        let keep_alive = valid || middle_committed;
        if keep_alive {
            self.last_valid_t_ms = Some(t_ms);
        } else {
            // Tracking is unreliable this frame: freeze rather than feed a
            // fabricated position into the anchor-relative/hover mappers.
            self.hover.reset();
            if self.mode != Mode::Lost {
                if let Some(last_valid) = self.last_valid_t_ms {
                    if t_ms.saturating_sub(last_valid) >= self.preset.tracking.lost_timeout_ms {
                        self.enter_lost(t_ms, &mut events);
                        self.last_valid_t_ms = Some(t_ms);
                    }
                }
            }
            return events;
        }

        let latch_armed = if self.mode == Mode::Idle {
            self.pinch_latch.update_arm(raw_index, t_ms, middle_committed)
        } else {
            false
        };
        let latch_released = if matches!(self.mode, Mode::Contact | Mode::Drag | Mode::DragScroll) {
            self.pinch_latch.update_release(raw_index, t_ms)
        } else {
            false
        };

        match self.mode {
            Mode::Idle => self.process_idle(
                t_ms,
                pos,
                confidence,
                valid,
                calm,
                index_committed,
                middle_committed,
                ring_committed,
                latch_armed,
                &mut events,
            ),
            Mode::Contact => self.process_contact(t_ms, pos, latch_released, &mut events),
            Mode::Drag => self.process_drag(t_ms, pos, middle_committed, latch_released, &mut events),
            Mode::Scroll => self.process_scroll(t_ms, pos, confidence, middle_committed, latch_released, &mut events),
            Mode::DragScroll => {
                self.process_drag_scroll(t_ms, pos, confidence, middle_committed, latch_released, &mut events)
            }
            Mode::Lost | Mode::Off => {}
        }

        if self.mode == Mode::Idle && calm && confidence >= self.preset.tracking.conf_recog.max(0.60) {
            if let Some((new_on, new_off)) = self.adapter.maybe_adapt(
                self.index_gate.p_on(),
                self.index_gate.p_off(),
                raw_index,
                t_ms,
            ) {
                self.index_gate.set_thresholds(new_on, new_off);
            }
        }

        events
    }

    fn enter_lost(&mut self, t_ms: u64, events: &mut Vec<InputEvent>) {
        let mut release_t = t_ms;
        if self.left_down {
            release_t = t_ms.max(self.contact_down_ms + MIN_PRESS_MS);
            events.push(InputEvent::Button { t_ms: release_t, button: Button::Left, action: ButtonAction::Up });
            self.left_down = false;
        }
        self.pinch_latch.force_release();
        self.pointer.reset();
        self.hover.reset();
        self.scroll.reset();
        events.push(InputEvent::ModeChanged { t_ms: release_t, mode: Mode::Lost });
        events.push(InputEvent::ModeChanged { t_ms: release_t, mode: Mode::Idle });
        self.mode = Mode::Idle;
    }

    #[allow(clippy::too_many_arguments)]
    fn process_idle(
        &mut self,
        t_ms: u64,
        pos: (f32, f32),
        confidence: f32,
        valid: bool,
        calm: bool,
        index_committed: bool,
        middle_committed: bool,
        ring_committed: bool,
        latch_armed: bool,
        events: &mut Vec<InputEvent>,
    ) {
        if t_ms < self.rc_block_until_ms {
            self.hover.reset();
            return;
        }

        if calm && index_committed && middle_committed {
            if let (Some(i_since), Some(m_since)) = (self.index_gate.on_since_ms(), self.middle_gate.on_since_ms()) {
                let apart = i_since.abs_diff(m_since);
                if apart <= CHORD_WINDOW_MS {
                    events.push(InputEvent::Button {
                        t_ms,
                        button: Button::Right,
                        action: ButtonAction::Click,
                    });
                    self.rc_block_until_ms = t_ms + RC_BLOCK_AFTER_CHORD_MS;
                    self.hover.reset();
                    return;
                }
            }
        }

        if self.preset.scroll.enabled
            && middle_committed
            && !self.pinch_latch.is_latched()
            && t_ms >= self.pointer.settle_until_ms()
        {
            if let Some(m_since) = self.middle_gate.on_since_ms() {
                if t_ms.saturating_sub(m_since) >= self.preset.scroll.arm_ms {
                    self.scroll.enter(pos.1);
                    self.scroll_hold_until_ms = t_ms + SCROLL_STICKY_HOLD_MS;
                    self.hover_block_until_ms = t_ms + SCROLL_ENTRY_HOVER_BLOCK_MS;
                    self.mode = Mode::Scroll;
                    events.push(InputEvent::ModeChanged { t_ms, mode: Mode::Scroll });
                    return;
                }
            }
        }

        if latch_armed {
            self.mode = Mode::Contact;
            self.left_down = true;
            self.contact_down_ms = t_ms;
            self.pointer.enter(pos, t_ms);
            events.push(InputEvent::Button { t_ms, button: Button::Left, action: ButtonAction::Down });
            events.push(InputEvent::ModeChanged { t_ms, mode: Mode::Contact });
            self.rc_block_until_ms = self.rc_block_until_ms.max(t_ms + RC_BLOCK_AFTER_CONTACT_MS);
            return;
        }

        if ring_committed && calm {
            events.push(InputEvent::Button { t_ms, button: Button::Right, action: ButtonAction::Down });
            events.push(InputEvent::Button { t_ms, button: Button::Right, action: ButtonAction::Up });
            self.hover_block_until_ms = t_ms + RING_TAP_HOVER_BLOCK_MS;
            self.hover.reset();
            return;
        }

        if self.preset.hover.enabled
            && valid
            && confidence >= self.preset.hover.min_conf
            && self.hover.in_safe_zone(pos)
            && t_ms >= self.hover_block_until_ms
        {
            if let Some((dx, dy)) = self.hover.step(pos, self.screen, t_ms) {
                events.push(InputEvent::Move { t_ms, dx, dy });
            }
        } else {
            self.hover.reset();
        }
    }

    fn process_contact(&mut self, t_ms: u64, pos: (f32, f32), latch_released: bool, events: &mut Vec<InputEvent>) {
        if let Some((dx, dy)) = self.pointer.step(pos, self.screen, t_ms) {
            events.push(InputEvent::Move { t_ms, dx, dy });
        }

        if latch_released {
            self.release_left_and_go_idle(t_ms, events);
            return;
        }

        if t_ms.saturating_sub(self.contact_down_ms) >= self.preset.click_drag.drag_hold_ms {
            self.mode = Mode::Drag;
            events.push(InputEvent::ModeChanged { t_ms, mode: Mode::Drag });
        }
    }

    fn process_drag(
        &mut self,
        t_ms: u64,
        pos: (f32, f32),
        middle_committed: bool,
        latch_released: bool,
        events: &mut Vec<InputEvent>,
    ) {
        if let Some((dx, dy)) = self.pointer.step(pos, self.screen, t_ms) {
            events.push(InputEvent::Move { t_ms, dx, dy });
        }

        if latch_released {
            self.release_left_and_go_idle(t_ms, events);
            return;
        }

        if middle_committed {
            self.scroll.enter(pos.1);
            self.scroll_hold_until_ms = t_ms + SCROLL_STICKY_HOLD_MS;
            self.mode = Mode::DragScroll;
            events.push(InputEvent::ModeChanged { t_ms, mode: Mode::DragScroll });
        }
    }

    fn process_scroll(
        &mut self,
        t_ms: u64,
        pos: (f32, f32),
        confidence: f32,
        middle_committed: bool,
        latch_released: bool,
        events: &mut Vec<InputEvent>,
    ) {
        let _ = latch_released;
        if middle_committed {
            self.scroll_hold_until_ms = t_ms + SCROLL_STICKY_HOLD_MS;
        }
        if t_ms > self.scroll_hold_until_ms {
            self.scroll.reset();
            self.hover_block_until_ms = t_ms + SCROLL_EXIT_HOVER_BLOCK_MS;
            self.mode = Mode::Idle;
            events.push(InputEvent::ModeChanged { t_ms, mode: Mode::Idle });
            return;
        }
        if let Some(ticks) = self.scroll.tick(pos.1, confidence, self.screen.1) {
            events.push(InputEvent::Scroll { t_ms, dx: 0, dy: ticks });
        }
    }

    fn process_drag_scroll(
        &mut self,
        t_ms: u64,
        pos: (f32, f32),
        confidence: f32,
        middle_committed: bool,
        latch_released: bool,
        events: &mut Vec<InputEvent>,
    ) {
        if latch_released {
            self.scroll.reset();
            self.release_left_and_go_idle(t_ms, events);
            return;
        }
        if middle_committed {
            self.scroll_hold_until_ms = t_ms + SCROLL_STICKY_HOLD_MS;
        }
        if t_ms > self.scroll_hold_until_ms {
            self.scroll.reset();
            self.mode = Mode::Drag;
            events.push(InputEvent::ModeChanged { t_ms, mode: Mode::Drag });
            return;
        }
        if let Some(ticks) = self.scroll.tick(pos.1, confidence, self.screen.1) {
            events.push(InputEvent::Scroll { t_ms, dx: 0, dy: ticks });
        }
    }

    fn release_left_and_go_idle(&mut self, t_ms: u64, events: &mut Vec<InputEvent>) {
        let release_t = t_ms.max(self.contact_down_ms + MIN_PRESS_MS);
        events.push(InputEvent::Button { t_ms: release_t, button: Button::Left, action: ButtonAction::Up });
        self.left_down = false;
        self.pointer.reset();
        self.mode = Mode::Idle;
        events.push(InputEvent::ModeChanged { t_ms: release_t, mode: Mode::Idle });
    }
}

#[cfg(test)]
mod scenarios {
    use super::*;
    use crate::config::Preset;
    use crate::types::{Handedness, PinchSignals};

    const SCREEN: (u32, u32) = (1920, 1080);

    fn hand(index: f32, middle: f32, ring: f32, confidence: f32) -> HandObservation {
        hand_at(0.5, index, middle, ring, confidence)
    }

    fn hand_at(y: f32, index: f32, middle: f32, ring: f32, confidence: f32) -> HandObservation {
        HandObservation {
            hand_id: 1,
            present: true,
            confidence,
            handedness: Handedness::Right,
            pos_norm: (0.5, y, 0.0),
            pinch: PinchSignals { index, middle, ring },
        }
    }

    fn frame(t_ms: u64, h: HandObservation) -> HandFrame {
        HandFrame { t_ms, hands: vec![h] }
    }

    fn absent_frame(t_ms: u64) -> HandFrame {
        HandFrame { t_ms, hands: vec![HandObservation::absent()] }
    }

    #[test]
    fn quick_pinch_produces_a_tap_click() {
        let mut interp = Interpreter::new(Preset::default_preset(), SCREEN, None);
        interp.process(frame(0, hand(0.10, 0.0, 0.0, 0.95)));
        let down = interp.process(frame(16, hand(0.80, 0.0, 0.0, 0.95)));
        assert!(down.iter().any(|e| matches!(e, InputEvent::Button { button: Button::Left, action: ButtonAction::Down, .. })));
        assert_eq!(interp.mode(), Mode::Contact);

        let up = interp.process(frame(110, hand(0.10, 0.0, 0.0, 0.95)));
        assert!(up.iter().any(|e| matches!(e, InputEvent::Button { button: Button::Left, action: ButtonAction::Up, .. })));
        assert_eq!(interp.mode(), Mode::Idle);
    }

    #[test]
    fn sustained_pinch_escalates_to_drag_then_releases() {
        let mut interp = Interpreter::new(Preset::default_preset(), SCREEN, None);
        interp.process(frame(0, hand(0.10, 0.0, 0.0, 0.95)));
        interp.process(frame(16, hand(0.80, 0.0, 0.0, 0.95)));
        assert_eq!(interp.mode(), Mode::Contact);

        interp.process(frame(250, hand(0.80, 0.0, 0.0, 0.95)));
        assert_eq!(interp.mode(), Mode::Drag);

        let up = interp.process(frame(400, hand(0.10, 0.0, 0.0, 0.95)));
        assert!(up.iter().any(|e| matches!(e, InputEvent::Button { button: Button::Left, action: ButtonAction::Up, .. })));
        assert_eq!(interp.mode(), Mode::Idle);
    }

    #[test]
    fn committed_middle_pinch_arms_scroll_and_motion_emits_ticks() {
        let mut interp = Interpreter::new(Preset::default_preset(), SCREEN, None);
        interp.process(frame(0, hand(0.0, 0.90, 0.0, 0.95)));
        interp.process(frame(70, hand(0.0, 0.90, 0.0, 0.95)));
        let entered = interp.process(frame(260, hand(0.0, 0.90, 0.0, 0.95)));
        assert_eq!(interp.mode(), Mode::Scroll);
        assert!(entered.iter().any(|e| matches!(e, InputEvent::ModeChanged { mode: Mode::Scroll, .. })));

        let ticked = interp.process(frame(300, hand_at(0.65, 0.0, 0.90, 0.0, 0.95)));
        assert!(ticked.iter().any(|e| matches!(e, InputEvent::Scroll { .. })));
    }

    #[test]
    fn tracking_loss_while_dragging_forces_release_and_recovers_to_idle() {
        let mut interp = Interpreter::new(Preset::default_preset(), SCREEN, None);
        interp.process(frame(0, hand(0.10, 0.0, 0.0, 0.95)));
        interp.process(frame(16, hand(0.80, 0.0, 0.0, 0.95)));
        assert_eq!(interp.mode(), Mode::Contact);

        let events = interp.process(absent_frame(200));
        assert!(events.iter().any(|e| matches!(e, InputEvent::Button { button: Button::Left, action: ButtonAction::Up, .. })));
        assert!(events.iter().any(|e| matches!(e, InputEvent::ModeChanged { mode: Mode::Lost, .. })));
        assert_eq!(interp.mode(), Mode::Idle);
    }

    #[test]
    fn index_and_middle_committing_within_the_chord_window_fires_a_right_click() {
        // The middle gate commits first (blocking the faster index latch from
        // arming a left click), then the index gate commits soon after within
        // the chord window, producing a right-click instead of a drag.
        let mut interp = Interpreter::new(Preset::default_preset(), SCREEN, None);
        let mut events = Vec::new();
        let mut t = 0u64;
        while t <= 60 {
            events = interp.process(frame(t, hand(0.0, 0.90, 0.0, 0.95)));
            t += 20;
        }
        assert_eq!(interp.mode(), Mode::Idle);

        while t <= 160 {
            events = interp.process(frame(t, hand(0.90, 0.90, 0.0, 0.95)));
            t += 20;
        }
        assert!(events.iter().any(|e| matches!(e, InputEvent::Button { button: Button::Right, action: ButtonAction::Click, .. })));
        assert_ne!(interp.mode(), Mode::Contact);
    }

    #[test]
    fn hand_selection_breaks_confidence_ties_toward_the_first_hand() {
        let a = HandObservation { hand_id: 1, confidence: 0.80, ..hand(0.0, 0.0, 0.0, 0.80) };
        let b = HandObservation { hand_id: 2, confidence: 0.80, ..hand(0.0, 0.0, 0.0, 0.80) };
        let hands = [a, b];
        let picked = Interpreter::select_hand(&hands).unwrap();
        assert_eq!(picked.hand_id, 1);
    }

    #[test]
    fn kill_switch_suppresses_processing_until_re_enabled() {
        let mut interp = Interpreter::new(Preset::default_preset(), SCREEN, None);
        interp.process(frame(0, hand(0.10, 0.0, 0.0, 0.95)));
        interp.process(frame(16, hand(0.80, 0.0, 0.0, 0.95)));
        assert_eq!(interp.mode(), Mode::Contact);

        let off_events = interp.set_off(true, 20);
        assert!(off_events.iter().any(|e| matches!(e, InputEvent::Button { button: Button::Left, action: ButtonAction::Up, .. })));
        assert_eq!(interp.mode(), Mode::Off);

        let suppressed = interp.process(frame(40, hand(0.80, 0.0, 0.0, 0.95)));
        assert!(suppressed.is_empty());
        assert_eq!(interp.mode(), Mode::Off);

        let on_events = interp.set_off(false, 60);
        assert!(on_events.iter().any(|e| matches!(e, InputEvent::ModeChanged { mode: Mode::Idle, .. })));
        assert_eq!(interp.mode(), Mode::Idle);
    }
}
