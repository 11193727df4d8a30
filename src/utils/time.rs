//! Time Utilities
//!
//! High-precision timing for the gesture loop.

use std::time::Instant;

/// Relative timestamp from a start time, used to derive the monotonic
/// millisecond clock the interpreter is driven with.
pub struct RelativeTimer {
    start: Instant,
}

impl RelativeTimer {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    /// Get microseconds since start
    pub fn elapsed_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Get milliseconds since start
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for RelativeTimer {
    fn default() -> Self {
        Self::new()
    }
}
