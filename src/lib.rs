//! handmouse
//!
//! A deterministic gesture interpreter that turns a stream of hand-tracking
//! frames into synthetic pointer events: hover-move, tap-to-click,
//! hold-to-drag, pinch-and-glide scroll, and a kill switch.

pub mod calibration;
pub mod config;
pub mod control;
pub mod error;
pub mod filters;
pub mod hand_source;
pub mod interpreter;
pub mod run_loop;
pub mod sink;
pub mod types;
pub mod utils;

pub use config::{CalibrationProfile, Preset, PresetName};
pub use interpreter::Interpreter;
pub use types::{Button, ButtonAction, HandFrame, HandObservation, Handedness, InputEvent, Mode, PinchSignals};
