use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use bevy::prelude::*;
use cr_core::StateSnapshot;

static DEBUG_HANDLE: OnceLock<DebugHandle> = OnceLock::new();

/// Shared view of the latest runner state, for automated tests.
///
/// Cloning shares the same slot. Updated once per frame by the debug plugin.
#[derive(Resource, Clone, Debug, Default)]
pub struct DebugHandle {
    latest: Arc<RwLock<Option<StateSnapshot>>>,
    frames: Arc<AtomicU64>,
}

impl DebugHandle {
    /// Latest published snapshot, if any frame has run yet.
    pub fn get_state(&self) -> Option<StateSnapshot> {
        self.latest
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn publish(&self, snapshot: StateSnapshot) {
        *self
            .latest
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot);
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of snapshots published so far.
    pub fn frames_published(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

/// Install the process-wide handle, or return the one already installed.
pub fn install() -> DebugHandle {
    DEBUG_HANDLE.get_or_init(DebugHandle::default).clone()
}

/// The process-wide handle, if [`install`] has been called.
pub fn handle() -> Option<&'static DebugHandle> {
    DEBUG_HANDLE.get()
}
