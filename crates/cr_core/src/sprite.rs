use bevy::prelude::*;

use crate::keys::KeyState;
use crate::viewport::Viewport;

/// Pulse advance per second of frame time.
pub const PULSE_RATE: f32 = 3.0;

/// Kinematic state of the controllable sprite.
///
/// Position is the sprite center in canvas coordinates (origin top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteState {
    pub position: Vec2,
    pub size: f32,
    /// Movement speed in logical pixels per second.
    pub speed: f32,
    /// Phase accumulator for the breathing wobble.
    pub pulse: f32,
}

impl SpriteState {
    pub fn new(position: Vec2, size: f32, speed: f32) -> Self {
        Self {
            position,
            size,
            speed,
            pulse: 0.0,
        }
    }

    pub fn half(&self) -> f32 {
        self.size / 2.0
    }

    /// Keep the whole sprite inside the viewport.
    ///
    /// If the viewport is narrower than the sprite the lower bound wins.
    pub fn clamp_to(&mut self, viewport: &Viewport) {
        let half = self.half();
        self.position.x = self.position.x.min(viewport.width - half).max(half);
        self.position.y = self.position.y.min(viewport.height - half).max(half);
    }

    /// Integrate one frame of movement from the held keys.
    pub fn step(&mut self, keys: &KeyState, viewport: &Viewport, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        let direction = keys.direction();
        if direction != Vec2::ZERO {
            self.position += direction.normalize() * self.speed * delta;
        }
        self.clamp_to(viewport);
        self.pulse += delta * PULSE_RATE;
    }

    /// Vertical offset of the breathing effect.
    pub fn bob(&self) -> f32 {
        self.pulse.sin() * 2.0
    }
}
