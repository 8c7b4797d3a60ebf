use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized, WindowScaleFactorChanged};
use cr_core::{DirectionKey, RunnerConfig, RunnerState};
use cr_render::sprite_extent;

use crate::surface::{sprite_world_position, viewport_from_window, CanvasTexture, RunnerCanvas, RunnerSprite};

/// Whether the browser's default action for `key` should be suppressed.
///
/// Only the arrow keys the driver consumes; everything else (reload, tab,
/// devtools) keeps working.
pub fn suppresses_default(key: &str) -> bool {
    DirectionKey::from_name(key).is_some()
}

/// Startup system: bind to the window surface and create the runner state.
pub fn attach_surface(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<RunnerConfig>,
    mut images: ResMut<Assets<Image>>,
    mut exit: EventWriter<AppExit>,
) {
    let viewport = match viewport_from_window(windows.get_single().ok(), &config.canvas_selector) {
        Ok(viewport) => viewport,
        Err(err) => {
            error!("Cannot start runner: {}", err);
            exit.send(AppExit::error());
            return;
        }
    };

    let state = RunnerState::new(&config, viewport);
    let mut texture = CanvasTexture::new(&mut images);
    texture.redraw(&state, &config.style, &mut images);

    commands.spawn((
        Sprite {
            image: texture.backdrop.handle.clone(),
            custom_size: Some(viewport.size()),
            ..default()
        },
        Transform::default(),
        RunnerCanvas,
    ));
    commands.spawn((
        Sprite {
            image: texture.sprite.handle.clone(),
            custom_size: Some(Vec2::splat(sprite_extent(state.sprite.size))),
            ..default()
        },
        Transform::from_translation(sprite_world_position(&state).extend(1.0)),
        RunnerSprite,
    ));

    info!(
        "Attached surface {}x{} @{}x (backing {}x{})",
        viewport.width,
        viewport.height,
        viewport.pixel_ratio,
        texture.backdrop.canvas.width(),
        texture.backdrop.canvas.height()
    );

    commands.insert_resource(texture);
    commands.insert_resource(state);
}

/// Follow window size and scale-factor changes.
pub fn handle_window_resize(
    mut resized: EventReader<WindowResized>,
    mut rescaled: EventReader<WindowScaleFactorChanged>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<RunnerConfig>,
    mut state: ResMut<RunnerState>,
    mut texture: ResMut<CanvasTexture>,
    mut images: ResMut<Assets<Image>>,
    mut backdrops: Query<&mut Sprite, With<RunnerCanvas>>,
) {
    let changed = resized.read().count() + rescaled.read().count() > 0;
    if !changed {
        return;
    }
    let Ok(window) = windows.get_single() else { return };

    state.handle_resize(window.width(), window.height(), window.scale_factor());
    if !texture.redraw(&state, &config.style, &mut images) {
        return;
    }

    for mut sprite in &mut backdrops {
        sprite.custom_size = Some(state.viewport.size());
    }

    debug!(
        "Viewport {}x{} @{}x",
        state.viewport.width, state.viewport.height, state.viewport.pixel_ratio
    );
}

/// Feed arrow-key presses and releases into the driver.
pub fn handle_keyboard(mut events: EventReader<KeyboardInput>, mut state: ResMut<RunnerState>) {
    for event in events.read() {
        let was_piloting = state.autopilot.is_enabled();
        let is_active = event.state == ButtonState::Pressed;

        if state.handle_key_change(event.key_code, is_active) && was_piloting {
            info!("Manual input on {:?}, autopilot off", event.key_code);
        }
    }
}

/// Per-frame update on the wall clock.
///
/// `Time<Real>` rather than the virtual clock, which clamps long gaps and
/// would hide stalls from the autopilot.
pub fn advance_driver(time: Res<Time<Real>>, mut state: ResMut<RunnerState>) {
    state.advance_frame(time.elapsed_secs_f64() * 1000.0);
}

/// Move the runner sprite to the driver's position.
pub fn sync_runner_sprite(state: Res<RunnerState>, mut sprites: Query<&mut Transform, With<RunnerSprite>>) {
    let position = sprite_world_position(&state);
    for mut transform in &mut sprites {
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

/// Log autopilot transitions, whatever caused them.
pub fn log_autopilot_transition(state: Res<RunnerState>, mut was_enabled: Local<bool>) {
    let enabled = state.autopilot.is_enabled();
    if enabled != *was_enabled {
        *was_enabled = enabled;
        info!("Autopilot: {}", if enabled { "On" } else { "Off" });
    }
}
