use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// Serializable copy of the whole runner state.
///
/// `keys` maps DOM key names to their held flag, matching the shape the
/// browser test harness reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub viewport: Viewport,
    pub keys: BTreeMap<String, bool>,
    pub sprite: SpriteSnapshot,
    pub autopilot: AutopilotSnapshot,
    /// Timestamp of the last processed frame, in milliseconds.
    pub last_timestamp: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteSnapshot {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
    pub pulse: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AutopilotSnapshot {
    pub enabled: bool,
    pub index: usize,
    pub elapsed: f64,
    pub steps: usize,
}

impl StateSnapshot {
    /// First held key in display order, if any.
    pub fn active_key(&self) -> Option<&str> {
        crate::keys::DirectionKey::all()
            .iter()
            .map(|key| key.name())
            .find(|name| self.keys.get(*name).copied().unwrap_or(false))
    }
}
