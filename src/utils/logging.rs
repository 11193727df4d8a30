//! Logging
//!
//! Logging init for the runtime binary. The interpreter itself only logs at
//! sparse points (warnings, mode transitions via the sink) so logging
//! overhead never lands on the per-frame hot path.

/// Initialize logging via `RUST_LOG`/env_logger.
pub fn init_env_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
