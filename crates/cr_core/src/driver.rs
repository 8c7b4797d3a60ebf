use bevy::prelude::*;

use crate::autopilot::Autopilot;
use crate::config::{Features, RunnerConfig};
use crate::keys::{DirectionKey, KeyState};
use crate::snapshot::{AutopilotSnapshot, SpriteSnapshot, StateSnapshot};
use crate::sprite::SpriteState;
use crate::viewport::Viewport;

/// The input/animation driver.
///
/// Owns every piece of mutable runner state. Host systems translate window,
/// keyboard and frame events into calls on this resource.
#[derive(Resource, Debug, Clone)]
pub struct RunnerState {
    pub viewport: Viewport,
    pub keys: KeyState,
    pub sprite: SpriteState,
    pub autopilot: Autopilot,
    features: Features,
    last_timestamp: Option<f64>,
}

impl RunnerState {
    /// Create the state for a freshly attached surface, sprite centered.
    pub fn new(config: &RunnerConfig, viewport: Viewport) -> Self {
        let mut sprite = SpriteState::new(viewport.center(), config.sprite.size, config.sprite.speed);
        sprite.clamp_to(&viewport);

        Self {
            viewport,
            keys: KeyState::new(),
            sprite,
            autopilot: Autopilot::new(config.autopilot.clone()),
            features: config.features,
            last_timestamp: None,
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    /// Adopt new surface dimensions and pull the sprite back inside them.
    pub fn handle_resize(&mut self, width: f32, height: f32, pixel_ratio: f32) {
        self.viewport = Viewport::new(width, height, pixel_ratio);
        self.sprite.clamp_to(&self.viewport);
    }

    /// Apply a key press or release.
    ///
    /// Returns `true` for directional keys, whose default host handling
    /// should be suppressed. Manual input always turns the autopilot off.
    pub fn handle_key_change(&mut self, key: KeyCode, is_active: bool) -> bool {
        match DirectionKey::from_key_code(key) {
            Some(key) => {
                self.apply_manual_key(key, is_active);
                true
            }
            None => false,
        }
    }

    /// Same as [`Self::handle_key_change`] but keyed by DOM key name.
    pub fn handle_named_key(&mut self, name: &str, is_active: bool) -> bool {
        match DirectionKey::from_name(name) {
            Some(key) => {
                self.apply_manual_key(key, is_active);
                true
            }
            None => false,
        }
    }

    fn apply_manual_key(&mut self, key: DirectionKey, is_active: bool) {
        if self.autopilot.is_enabled() {
            self.autopilot.set_enabled(false, &mut self.keys);
        }
        self.keys.set(key, is_active);
    }

    /// Returns whether the autopilot state changed.
    pub fn set_autopilot_enabled(&mut self, enabled: bool) -> bool {
        if !self.features.autopilot {
            return false;
        }
        self.autopilot.set_enabled(enabled, &mut self.keys)
    }

    /// Flip the autopilot; returns the resulting enabled flag.
    pub fn toggle_autopilot(&mut self) -> bool {
        let target = !self.autopilot.is_enabled();
        self.set_autopilot_enabled(target);
        self.autopilot.is_enabled()
    }

    pub fn update_autopilot(&mut self, delta: f64) {
        if !self.features.autopilot {
            return;
        }
        self.autopilot.update(delta, &mut self.keys);
    }

    pub fn update_sprite(&mut self, delta: f32) {
        self.sprite.step(&self.keys, &self.viewport, delta);
    }

    /// Run the per-frame update for a host timestamp in milliseconds.
    ///
    /// The first frame has a zero delta; timestamps going backwards are
    /// treated as no time passing. Returns the delta in seconds.
    pub fn advance_frame(&mut self, timestamp_ms: f64) -> f64 {
        let delta = match self.last_timestamp {
            Some(last) => ((timestamp_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);

        self.update_autopilot(delta);
        self.update_sprite(delta as f32);
        delta
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            viewport: self.viewport,
            keys: DirectionKey::all()
                .iter()
                .map(|key| (key.name().to_string(), self.keys.is_held(*key)))
                .collect(),
            sprite: SpriteSnapshot {
                x: self.sprite.position.x,
                y: self.sprite.position.y,
                size: self.sprite.size,
                speed: self.sprite.speed,
                pulse: self.sprite.pulse,
            },
            autopilot: AutopilotSnapshot {
                enabled: self.autopilot.is_enabled(),
                index: self.autopilot.index(),
                elapsed: self.autopilot.elapsed(),
                steps: self.autopilot.sequence().len(),
            },
            last_timestamp: self.last_timestamp,
        }
    }
}
