use bevy::prelude::*;
use cr_core::RunnerState;

pub mod handle;
pub mod snapshot_io;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use handle::{handle, install, DebugHandle};
pub use snapshot_io::{load_snapshot, save_snapshot, snapshot_path, SnapshotIoError};

/// Key that writes the current snapshot to disk.
pub const DUMP_KEY: KeyCode = KeyCode::F9;

/// Debug plugin for Canvas Runner.
/// Publishes a state snapshot every frame when the `debug_handle` feature is on.
pub struct CrDebugPlugin;

impl Plugin for CrDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostStartup, install_debug_handle)
            .add_systems(
                PostUpdate,
                (publish_snapshot, dump_snapshot_on_key)
                    .run_if(resource_exists::<DebugHandle>)
                    .run_if(resource_exists::<RunnerState>),
            );
    }
}

fn install_debug_handle(mut commands: Commands, state: Option<Res<RunnerState>>) {
    let Some(state) = state else { return };
    if !state.features().debug_handle {
        return;
    }

    let handle = install();
    handle.publish(state.snapshot());

    #[cfg(target_arch = "wasm32")]
    if let Err(err) = web::expose_on_window(handle.clone()) {
        error!("Failed to expose {}: {:?}", web::GLOBAL_NAME, err);
    }

    commands.insert_resource(handle);
    info!("Debug handle installed");
}

fn publish_snapshot(state: Res<RunnerState>, handle: Res<DebugHandle>) {
    handle.publish(state.snapshot());
}

fn dump_snapshot_on_key(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<RunnerState>,
    handle: Res<DebugHandle>,
) {
    if !keyboard.just_pressed(DUMP_KEY) {
        return;
    }

    let path = snapshot_path(handle.frames_published());
    match save_snapshot(&path, &state.snapshot()) {
        Ok(()) => info!("Saved snapshot to {}", path.display()),
        Err(e) => error!("Failed to save snapshot: {}", e),
    }
}
