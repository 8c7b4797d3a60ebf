use bevy::prelude::*;
use cr_core::{RunnerConfig, RunnerError};

fn main() -> AppExit {
    let config = match load_startup_config() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up until the app is built.
            eprintln!("Failed to load config: {}", e);
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: config.title.clone(),
                canvas: Some(config.canvas_selector.clone()),
                fit_canvas_to_parent: true,
                prevent_default_event_handling: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .insert_resource(config)
        // Plugins
        .add_plugins((
            cr_core::CrCorePlugin,
            cr_player::CrPlayerPlugin,
            cr_hud::CrHudPlugin,
            cr_debug::CrDebugPlugin,
        ))
        .add_systems(Startup, setup_camera)
        .run()
}

#[cfg(not(target_arch = "wasm32"))]
fn load_startup_config() -> Result<RunnerConfig, RunnerError> {
    use cr_core::config::{config_path, load_config_or_default};

    let path = config_path();
    let config = load_config_or_default(&path)?;
    println!("Config: {} (features {:?})", path.display(), config.features);
    Ok(config)
}

#[cfg(target_arch = "wasm32")]
fn load_startup_config() -> Result<RunnerConfig, RunnerError> {
    // No filesystem in the browser; the page build carries the test hook.
    Ok(RunnerConfig {
        features: cr_core::Features::testing(),
        ..RunnerConfig::default()
    })
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
