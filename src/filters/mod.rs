//! Smoothing and gating primitives shared by the interpreter's subsystems.

mod hysteresis;
mod one_euro;

pub use hysteresis::DebouncedHysteresis;
pub use one_euro::{OneEuro, OneEuroParams};
