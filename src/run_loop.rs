//! Runtime Loop
//!
//! Wires a `HandSource`, `Interpreter`, `ControlState` and `InputSink`
//! together into the polling loop a real binary drives: poll the kill
//! switch, poll the sensor, feed the interpreter, apply the output.

use std::thread;
use std::time::{Duration, Instant};

use log::info;

use crate::control::{ControlState, FileFlag, KillSwitchGuard};
use crate::hand_source::HandSource;
use crate::interpreter::Interpreter;
use crate::sink::{GuardedSink, InputSink};
use crate::utils::time::RelativeTimer;

pub struct LoopConfig {
    pub target_hz: u32,
    /// Poll the on-disk kill-switch mirror this often; it is not read every frame.
    pub file_flag_poll_every: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { target_hz: 90, file_flag_poll_every: 10 }
    }
}

/// Runs until `should_stop` returns `true`. Blocking; intended to run on its
/// own dedicated thread.
pub fn run_loop<H, S>(
    mut source: H,
    mut interpreter: Interpreter,
    control: ControlState,
    sink: S,
    cfg: LoopConfig,
    mut should_stop: impl FnMut() -> bool,
) where
    H: HandSource,
    S: InputSink,
{
    let clock = RelativeTimer::new();
    let frame_period = Duration::from_secs_f64(1.0 / cfg.target_hz as f64);
    let file_flag = FileFlag::new();

    let mut guard: KillSwitchGuard<S> = KillSwitchGuard::new(control.clone());
    let mut sink = GuardedSink::new(sink);

    info!("gesture loop starting at {} Hz", cfg.target_hz);

    let mut tick: u32 = 0;
    while !should_stop() {
        let frame_start = Instant::now();
        let t_ms = clock.elapsed_ms();

        if let Some(flag) = &file_flag {
            if tick % cfg.file_flag_poll_every == 0 {
                if let Some(enabled) = flag.read() {
                    control.set_enabled(enabled);
                }
            }
        }
        tick = tick.wrapping_add(1);

        guard.poll(&mut interpreter, &mut sink, t_ms);

        let frame = source.poll(t_ms);
        let events = interpreter.process(frame);
        sink.apply_all(&events);

        let elapsed = frame_start.elapsed();
        if elapsed < frame_period {
            thread::sleep(frame_period - elapsed);
        }
    }

    sink.force_release_all();
    info!("gesture loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::hand_source::FakeHandSource;
    use crate::sink::RecordingSink;

    #[test]
    fn loop_stops_immediately_when_should_stop_is_true() {
        let source = FakeHandSource::new(vec![FakeHandSource::resting_hand()]);
        let interpreter = Interpreter::new(Preset::default_preset(), (1920, 1080), None);
        let control = ControlState::new(true);
        let sink = RecordingSink::default();
        run_loop(source, interpreter, control, sink, LoopConfig::default(), || true);
    }
}
