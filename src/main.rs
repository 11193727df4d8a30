//! handmouse - hands-free mouse daemon
//!
//! Wires a hand-tracking source, the gesture interpreter, the kill switch
//! and an output sink into the runtime loop. The sensor front-end is not
//! part of this crate; this binary drives a `FakeHandSource` so it runs
//! out of the box, which is useful for smoke-testing a build and for
//! demonstrating the wiring a real sensor integration would replace.

use log::info;

use handmouse::config::{Preset, PresetName};
use handmouse::control::ControlState;
use handmouse::hand_source::FakeHandSource;
use handmouse::interpreter::Interpreter;
use handmouse::run_loop::{run_loop, LoopConfig};
use handmouse::sink::NullSink;

#[cfg(target_os = "linux")]
use handmouse::sink::UinputSink;

fn main() -> anyhow::Result<()> {
    handmouse::utils::init_env_logger();

    let preset_name = match std::env::args().nth(1).as_deref() {
        Some("precision") => PresetName::Precision,
        Some("chill") => PresetName::Chill,
        _ => PresetName::Default,
    };
    let preset: Preset = preset_name.resolve();

    let screen = detect_screen_size();
    info!("starting handmouse with preset {preset_name:?} at {screen:?}");

    let interpreter = Interpreter::with_profile_from_disk(preset, screen);
    let control = ControlState::new(true);
    let source = FakeHandSource::new(vec![FakeHandSource::resting_hand()]);
    let cfg = LoopConfig::default();

    #[cfg(target_os = "linux")]
    {
        match UinputSink::new() {
            Ok(sink) => {
                run_loop(source, interpreter, control, sink, cfg, || false);
                return Ok(());
            }
            Err(err) => {
                log::warn!("uinput unavailable ({err}), falling back to a null sink");
            }
        }
    }

    run_loop(source, interpreter, control, NullSink, cfg, || false);
    Ok(())
}

/// Best-effort primary display resolution; falls back to 1080p when it
/// cannot be determined without a platform windowing dependency.
fn detect_screen_size() -> (u32, u32) {
    (1920, 1080)
}
