//! Output Sinks
//!
//! `InputSink` is the narrow capability contract the interpreter's events are
//! applied through. `GuardedSink` enforces the minimum real-time press
//! duration and de-duplicates redundant DOWNs; it is the only path by which
//! the interpreter's timestamps turn into actual OS-level delays.

use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use crate::interpreter::MIN_PRESS_MS;
use crate::types::{Button, ButtonAction, InputEvent};

/// A synthetic pointing device. Implementors do not see `HandFrame`s or
/// interpreter state, only the four primitive operations a mouse exposes.
pub trait InputSink {
    fn move_by(&mut self, dx: i32, dy: i32);
    fn scroll(&mut self, dx: i32, dy: i32);
    fn button_left(&mut self, down: bool);
    fn button_right(&mut self, down: bool);
}

/// Wraps any `InputSink`, applying `InputEvent`s to it while enforcing the
/// minimum LEFT press duration and swallowing duplicate DOWNs.
pub struct GuardedSink<S: InputSink> {
    inner: S,
    left_down_at: Option<Instant>,
    left_is_down: bool,
    right_is_down: bool,
}

impl<S: InputSink> GuardedSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, left_down_at: None, left_is_down: false, right_is_down: false }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Apply a batch of events in order, sleeping the calling thread as
    /// needed to satisfy the minimum LEFT press duration.
    pub fn apply_all(&mut self, events: &[InputEvent]) {
        for event in events {
            self.apply(event);
        }
    }

    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::Move { dx, dy, .. } => self.inner.move_by(dx, dy),
            InputEvent::Scroll { dx, dy, .. } => self.inner.scroll(dx, dy),
            InputEvent::Button { button, action, .. } => self.apply_button(button, action),
            InputEvent::ModeChanged { mode, .. } => debug!("mode -> {mode:?}"),
        }
    }

    fn apply_button(&mut self, button: Button, action: ButtonAction) {
        match (button, action) {
            (Button::Left, ButtonAction::Down) => {
                if !self.left_is_down {
                    self.left_is_down = true;
                    self.left_down_at = Some(Instant::now());
                    self.inner.button_left(true);
                }
            }
            (Button::Left, ButtonAction::Up) => {
                if self.left_is_down {
                    self.wait_min_press();
                    self.left_is_down = false;
                    self.left_down_at = None;
                    self.inner.button_left(false);
                }
            }
            (Button::Left, ButtonAction::Click) => {
                self.inner.button_left(true);
                thread::sleep(Duration::from_millis(MIN_PRESS_MS));
                self.inner.button_left(false);
            }
            (Button::Right, ButtonAction::Down) => {
                if !self.right_is_down {
                    self.right_is_down = true;
                    self.inner.button_right(true);
                }
            }
            (Button::Right, ButtonAction::Up) => {
                if self.right_is_down {
                    self.right_is_down = false;
                    self.inner.button_right(false);
                }
            }
            (Button::Right, ButtonAction::Click) => {
                self.inner.button_right(true);
                thread::sleep(Duration::from_millis(MIN_PRESS_MS));
                self.inner.button_right(false);
            }
        }
    }

    fn wait_min_press(&self) {
        if let Some(down_at) = self.left_down_at {
            let elapsed = down_at.elapsed();
            let min = Duration::from_millis(MIN_PRESS_MS);
            if elapsed < min {
                thread::sleep(min - elapsed);
            }
        }
    }

    /// Force both buttons up without any minimum-press delay, used by the
    /// kill-switch guard as a last-resort safety net.
    pub fn force_release_all(&mut self) {
        if self.left_is_down {
            self.left_is_down = false;
            self.left_down_at = None;
            self.inner.button_left(false);
        }
        if self.right_is_down {
            self.right_is_down = false;
            self.inner.button_right(false);
        }
    }
}

/// A no-op sink useful for tests and dry runs; records nothing itself but
/// never panics even without a display server or uinput device present.
#[derive(Debug, Default)]
pub struct NullSink;

impl InputSink for NullSink {
    fn move_by(&mut self, _dx: i32, _dy: i32) {}
    fn scroll(&mut self, _dx: i32, _dy: i32) {}
    fn button_left(&mut self, _down: bool) {}
    fn button_right(&mut self, _down: bool) {}
}

/// Records every call for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub moves: Vec<(i32, i32)>,
    pub scrolls: Vec<(i32, i32)>,
    pub left_down: bool,
    pub right_down: bool,
    pub left_down_events: u32,
    pub left_up_events: u32,
}

impl InputSink for RecordingSink {
    fn move_by(&mut self, dx: i32, dy: i32) {
        self.moves.push((dx, dy));
    }
    fn scroll(&mut self, dx: i32, dy: i32) {
        self.scrolls.push((dx, dy));
    }
    fn button_left(&mut self, down: bool) {
        self.left_down = down;
        if down {
            self.left_down_events += 1;
        } else {
            self.left_up_events += 1;
        }
    }
    fn button_right(&mut self, down: bool) {
        self.right_down = down;
    }
}

#[cfg(target_os = "linux")]
mod uinput {
    use std::io;

    use evdev::{
        uinput::{VirtualDevice, VirtualDeviceBuilder},
        AttributeSet, EventType, InputEvent as EvInputEvent, Key, RelativeAxisType,
    };
    use log::error;

    use super::InputSink;

    /// A virtual `/dev/uinput` mouse. Requires write access to `/dev/uinput`
    /// (typically membership in the `input` group or CAP_SYS_ADMIN).
    pub struct UinputSink {
        device: VirtualDevice,
    }

    impl UinputSink {
        pub fn new() -> io::Result<Self> {
            let mut keys = AttributeSet::<Key>::new();
            keys.insert(Key::BTN_LEFT);
            keys.insert(Key::BTN_RIGHT);

            let mut axes = AttributeSet::<RelativeAxisType>::new();
            axes.insert(RelativeAxisType::REL_X);
            axes.insert(RelativeAxisType::REL_Y);
            axes.insert(RelativeAxisType::REL_WHEEL);

            let device = VirtualDeviceBuilder::new()?
                .name("handmouse virtual mouse")
                .with_keys(&keys)?
                .with_relative_axes(&axes)?
                .build()?;

            Ok(Self { device })
        }

        fn emit(&mut self, events: &[EvInputEvent]) {
            if let Err(err) = self.device.emit(events) {
                error!("uinput emit failed: {err}");
            }
        }
    }

    impl InputSink for UinputSink {
        fn move_by(&mut self, dx: i32, dy: i32) {
            if dx == 0 && dy == 0 {
                return;
            }
            self.emit(&[
                EvInputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx),
                EvInputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_Y.0, dy),
            ]);
        }

        fn scroll(&mut self, _dx: i32, dy: i32) {
            if dy == 0 {
                return;
            }
            self.emit(&[EvInputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_WHEEL.0, dy)]);
        }

        fn button_left(&mut self, down: bool) {
            self.emit(&[EvInputEvent::new(EventType::KEY, Key::BTN_LEFT.code(), down as i32)]);
        }

        fn button_right(&mut self, down: bool) {
            self.emit(&[EvInputEvent::new(EventType::KEY, Key::BTN_RIGHT.code(), down as i32)]);
        }
    }
}

#[cfg(target_os = "linux")]
pub use uinput::UinputSink;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_expands_to_down_then_up() {
        let mut sink = GuardedSink::new(RecordingSink::default());
        sink.apply(&InputEvent::Button { t_ms: 0, button: Button::Left, action: ButtonAction::Click });
        assert_eq!(sink.into_inner().left_down_events, 1);
    }

    #[test]
    fn duplicate_down_is_deduplicated() {
        let mut sink = GuardedSink::new(RecordingSink::default());
        sink.apply(&InputEvent::Button { t_ms: 0, button: Button::Left, action: ButtonAction::Down });
        sink.apply(&InputEvent::Button { t_ms: 1, button: Button::Left, action: ButtonAction::Down });
        let inner = sink.into_inner();
        assert_eq!(inner.left_down_events, 1);
    }

    #[test]
    fn force_release_clears_held_buttons_without_a_matching_up() {
        let mut sink = GuardedSink::new(RecordingSink::default());
        sink.apply(&InputEvent::Button { t_ms: 0, button: Button::Left, action: ButtonAction::Down });
        sink.force_release_all();
        assert!(!sink.into_inner().left_down);
    }
}
