use std::fs;
use std::path::{Path, PathBuf};

use cr_core::StateSnapshot;
use thiserror::Error;

/// Default directory for snapshot dumps.
pub const SNAPSHOTS_DIR: &str = "debug/snapshots";

/// Error type for snapshot I/O operations.
#[derive(Debug, Error)]
pub enum SnapshotIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    Ron(#[from] ron::Error),
    #[error("RON parse error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
}

/// Save a state snapshot to a RON file, creating parent directories.
pub fn save_snapshot(path: &Path, snapshot: &StateSnapshot) -> Result<(), SnapshotIoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .separate_tuple_members(true);

    let ron_string = ron::ser::to_string_pretty(snapshot, pretty_config)?;
    fs::write(path, ron_string)?;
    Ok(())
}

/// Load a state snapshot from a RON file.
pub fn load_snapshot(path: &Path) -> Result<StateSnapshot, SnapshotIoError> {
    let contents = fs::read_to_string(path)?;
    let snapshot: StateSnapshot = ron::from_str(&contents)?;
    Ok(snapshot)
}

/// File name for the snapshot taken at `frame`.
pub fn snapshot_filename(frame: u64) -> String {
    format!("snapshot_{:08}.ron", frame)
}

/// Full path for the snapshot taken at `frame`.
pub fn snapshot_path(frame: u64) -> PathBuf {
    Path::new(SNAPSHOTS_DIR).join(snapshot_filename(frame))
}
