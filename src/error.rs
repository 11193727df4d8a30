//! Error Types
//!
//! The interpreter's own `process`/`set_off` surface never fails; errors are
//! confined to the explicit I/O-touching config and profile loaders.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a config directory for this platform")]
    NoConfigDir,

    #[error("failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
