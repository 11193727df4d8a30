//! Core Data Model
//!
//! The frame/event contract the interpreter consumes and produces.

use serde::{Deserialize, Serialize};

/// Handedness tag attached to a tracked hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

/// Per-finger pinch strengths in `[0, 1]`, higher means tighter pinch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchSignals {
    pub index: f32,
    pub middle: f32,
    pub ring: f32,
}

impl PinchSignals {
    pub const ZERO: PinchSignals = PinchSignals { index: 0.0, middle: 0.0, ring: 0.0 };
}

/// A single tracked hand within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub hand_id: u32,
    pub present: bool,
    pub confidence: f32,
    pub handedness: Handedness,
    /// Normalized camera-space position of the anatomical reference point; `z` unused by v1.
    pub pos_norm: (f32, f32, f32),
    pub pinch: PinchSignals,
}

impl HandObservation {
    pub fn absent() -> Self {
        Self {
            hand_id: 0,
            present: false,
            confidence: 0.0,
            handedness: Handedness::Unknown,
            pos_norm: (0.5, 0.5, 0.0),
            pinch: PinchSignals::ZERO,
        }
    }
}

/// One sampled instant of the hand-tracking stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    pub t_ms: u64,
    pub hands: Vec<HandObservation>,
}

/// Mouse button identifiers the interpreter can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Button {
    Left,
    Right,
}

/// A button transition: a discrete press, release, or an atomic click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonAction {
    Down,
    Up,
    Click,
}

/// The seven states of the interpreter's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Idle,
    Contact,
    Drag,
    Scroll,
    DragScroll,
    Lost,
    Off,
}

/// A synthetic input event, tagged by variant so exactly one payload applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Move { t_ms: u64, dx: i32, dy: i32 },
    Button { t_ms: u64, button: Button, action: ButtonAction },
    Scroll { t_ms: u64, dx: i32, dy: i32 },
    ModeChanged { t_ms: u64, mode: Mode },
}

impl InputEvent {
    pub fn t_ms(&self) -> u64 {
        match *self {
            InputEvent::Move { t_ms, .. }
            | InputEvent::Button { t_ms, .. }
            | InputEvent::Scroll { t_ms, .. }
            | InputEvent::ModeChanged { t_ms, .. } => t_ms,
        }
    }
}
