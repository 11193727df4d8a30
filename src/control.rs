//! Kill-Switch Transport
//!
//! `ControlState` is the in-process atomic enable flag; `FileFlag` mirrors
//! it to disk so an out-of-process hotkey listener or tray icon can flip it.
//! `KillSwitchGuard` is the piece that actually makes a falling edge stick:
//! it tells the interpreter to go `Off` and, belt-and-suspenders, forces the
//! sink's buttons up directly in case interpreter bookkeeping were ever wrong.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::warn;

use crate::interpreter::Interpreter;
use crate::sink::{GuardedSink, InputSink};

/// Shared, cheaply-cloneable enable flag. `true` means gestures drive the
/// pointer; `false` is the kill-switch state.
#[derive(Clone)]
pub struct ControlState {
    enabled: Arc<AtomicBool>,
}

impl ControlState {
    pub fn new(enabled: bool) -> Self {
        Self { enabled: Arc::new(AtomicBool::new(enabled)) }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn toggle(&self) -> bool {
        let new_value = !self.is_enabled();
        self.set_enabled(new_value);
        new_value
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(true)
    }
}

/// On-disk mirror of the enable flag: a single `"1"`/`"0"` byte under the
/// platform config directory. Any process that can write that file can
/// drive the kill switch without linking against this crate.
pub struct FileFlag {
    path: PathBuf,
}

impl FileFlag {
    pub fn new() -> Option<Self> {
        let path = crate::utils::get_app_data_dir()?.join("enabled.flag");
        Some(Self { path })
    }

    pub fn write(&self, enabled: bool) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = crate::utils::ensure_dir(&parent.to_path_buf()) {
                warn!("could not create control dir {}: {err}", parent.display());
                return;
            }
        }
        if let Err(err) = std::fs::write(&self.path, if enabled { "1" } else { "0" }) {
            warn!("could not write kill-switch flag: {err}");
        }
    }

    /// Read the on-disk flag. Returns `None` if the file is absent or unreadable,
    /// which callers should treat as "no change".
    pub fn read(&self) -> Option<bool> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match content.trim() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }
}

/// Wires a `ControlState` into an `Interpreter` + `GuardedSink` pair: call
/// `poll` once per loop tick before `process`.
pub struct KillSwitchGuard<S: InputSink> {
    control: ControlState,
    last_seen_enabled: bool,
    _sink: std::marker::PhantomData<S>,
}

impl<S: InputSink> KillSwitchGuard<S> {
    pub fn new(control: ControlState) -> Self {
        let last_seen_enabled = control.is_enabled();
        Self { control, last_seen_enabled, _sink: std::marker::PhantomData }
    }

    /// Detect edges in the enable flag and apply `set_off` / force-release
    /// accordingly. Call once per frame, before `interpreter.process`.
    pub fn poll(&mut self, interpreter: &mut Interpreter, sink: &mut GuardedSink<S>, t_ms: u64) {
        let enabled = self.control.is_enabled();
        if enabled == self.last_seen_enabled {
            return;
        }
        self.last_seen_enabled = enabled;

        let events = interpreter.set_off(!enabled, t_ms);
        sink.apply_all(&events);
        if !enabled {
            sink.force_release_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_returns_new_value() {
        let control = ControlState::new(true);
        assert!(!control.toggle());
        assert!(!control.is_enabled());
    }

    #[test]
    fn kill_switch_guard_ignores_unchanged_state() {
        let control = ControlState::new(true);
        let mut guard: KillSwitchGuard<crate::sink::RecordingSink> = KillSwitchGuard::new(control.clone());
        let mut interpreter = Interpreter::new(crate::config::Preset::default_preset(), (1920, 1080), None);
        let mut sink = GuardedSink::new(crate::sink::RecordingSink::default());
        guard.poll(&mut interpreter, &mut sink, 0);
        assert_eq!(interpreter.mode(), crate::types::Mode::Idle);
    }
}
