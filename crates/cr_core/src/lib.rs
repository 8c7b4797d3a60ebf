use bevy::prelude::*;

pub mod autopilot;
pub mod config;
pub mod driver;
pub mod error;
pub mod keys;
pub mod snapshot;
pub mod sprite;
pub mod viewport;

pub use autopilot::{Autopilot, AutopilotStep};
pub use config::{Features, RenderStyle, Rgba8, RunnerConfig, SpriteConfig};
pub use driver::RunnerState;
pub use error::RunnerError;
pub use keys::{DirectionKey, KeyState};
pub use snapshot::StateSnapshot;
pub use sprite::SpriteState;
pub use viewport::Viewport;

/// Core plugin for Canvas Runner.
/// Makes sure a config resource exists before the surface is attached.
pub struct CrCorePlugin;

impl Plugin for CrCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RunnerConfig>();
    }
}
