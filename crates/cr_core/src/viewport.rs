use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Visible drawing area in logical pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Build a viewport, replacing unusable host values.
    ///
    /// Negative or non-finite sizes become 0, a non-positive ratio becomes 1.
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        let size = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: size(width),
            height: size(height),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.size() / 2.0
    }

    /// Backing-store dimensions in device pixels.
    pub fn backing_size(&self) -> UVec2 {
        UVec2::new(
            (self.width * self.pixel_ratio).floor() as u32,
            (self.height * self.pixel_ratio).floor() as u32,
        )
    }
}
