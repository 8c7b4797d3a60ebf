use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while bringing the runner up.
///
/// Per-frame operations never fail; everything here happens at startup.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("drawing surface `{selector}` not found")]
    MissingSurface { selector: String },

    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RON parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    #[error("RON serialization error: {0}")]
    ConfigSerialize(#[from] ron::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
