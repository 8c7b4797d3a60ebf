use bevy::prelude::*;
use cr_core::RunnerState;

pub mod surface;
pub mod systems;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use surface::{CanvasLayer, CanvasTexture, RunnerCanvas, RunnerSprite};

/// Player plugin for Canvas Runner.
/// Binds the driver to the window: surface, resize, keyboard and the frame loop.
pub struct CrPlayerPlugin;

impl Plugin for CrPlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, systems::attach_surface)
            .add_systems(
                Update,
                (
                    systems::handle_window_resize,
                    systems::handle_keyboard,
                    systems::advance_driver,
                    systems::sync_runner_sprite,
                    systems::log_autopilot_transition,
                )
                    .chain()
                    .run_if(resource_exists::<RunnerState>),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, install_key_filter);
    }
}

#[cfg(target_arch = "wasm32")]
fn install_key_filter() {
    if let Err(err) = web::install_key_filter() {
        error!("Failed to install key filter: {:?}", err);
    }
}
