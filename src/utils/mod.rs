//! Utility Functions
//!
//! Common utilities used throughout the runtime.

pub mod logging;
pub mod time;

pub use logging::*;
pub use time::*;

use std::path::PathBuf;

/// Platform config directory for this app, e.g. `$XDG_CONFIG_HOME/handmouse`.
/// `None` if the platform has no resolvable config directory.
pub fn get_app_data_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("handmouse"))
}

/// Ensure a directory exists, creating parents as needed.
pub fn ensure_dir(path: &PathBuf) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
