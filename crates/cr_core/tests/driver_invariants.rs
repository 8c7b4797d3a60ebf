//! Property tests for the input/animation state machine.
//!
//! Verifies:
//! 1. The sprite stays inside the viewport for any delta and key combination
//! 2. Diagonal movement is no faster than axis-aligned movement
//! 3. Opposite keys cancel out
//! 4. Autopilot steps advance exactly on their boundaries and wrap
//! 5. Re-enabling the autopilot starts from a clean slate
//! 6. Manual input hands control back with only the pressed key held
//! 7. Resizing re-clamps the sprite without further input

use bevy::prelude::*;
use cr_core::{
    AutopilotStep, DirectionKey, Features, RunnerConfig, RunnerState, Viewport,
};
use proptest::prelude::*;

fn config_with(steps: Vec<AutopilotStep>) -> RunnerConfig {
    RunnerConfig {
        autopilot: steps,
        features: Features::testing(),
        ..RunnerConfig::default()
    }
}

fn held(state: &RunnerState) -> Vec<DirectionKey> {
    state.keys.held_keys().collect()
}

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_key() -> impl Strategy<Value = DirectionKey> {
    prop_oneof![
        Just(DirectionKey::ArrowUp),
        Just(DirectionKey::ArrowDown),
        Just(DirectionKey::ArrowLeft),
        Just(DirectionKey::ArrowRight),
    ]
}

fn arb_key_mask() -> impl Strategy<Value = [bool; 4]> {
    any::<[bool; 4]>()
}

fn apply_mask(state: &mut RunnerState, mask: [bool; 4]) {
    for (key, active) in DirectionKey::all().iter().zip(mask) {
        state.handle_named_key(key.name(), active);
    }
}

// ── Movement ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sprite_stays_in_bounds(
        width in 60.0f32..2000.0,
        height in 60.0f32..2000.0,
        start_x in -500.0f32..2500.0,
        start_y in -500.0f32..2500.0,
        mask in arb_key_mask(),
        deltas in prop::collection::vec(0.0f32..5.0, 1..20),
    ) {
        let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(width, height, 1.0));
        state.sprite.position = Vec2::new(start_x, start_y);
        apply_mask(&mut state, mask);

        for delta in deltas {
            state.update_sprite(delta);
            let half = state.sprite.half();
            prop_assert!(state.sprite.position.x >= half);
            prop_assert!(state.sprite.position.x <= width - half);
            prop_assert!(state.sprite.position.y >= half);
            prop_assert!(state.sprite.position.y <= height - half);
        }
    }

    #[test]
    fn diagonal_speed_matches_axis_speed(
        horizontal in prop_oneof![Just("ArrowLeft"), Just("ArrowRight")],
        vertical in prop_oneof![Just("ArrowUp"), Just("ArrowDown")],
        delta in 0.001f32..0.05,
    ) {
        let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(4000.0, 4000.0, 1.0));
        let start = state.sprite.position;
        state.handle_named_key(horizontal, true);
        state.handle_named_key(vertical, true);

        state.update_sprite(delta);

        let travelled = state.sprite.position.distance(start);
        let expected = state.sprite.speed * delta;
        prop_assert!((travelled - expected).abs() < 1e-3 * expected.max(1.0));
    }

    #[test]
    fn opposite_keys_cancel(
        vertical in any::<bool>(),
        delta in 0.0f32..2.0,
    ) {
        let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(800.0, 600.0, 1.0));
        let start = state.sprite.position;
        if vertical {
            state.handle_named_key("ArrowUp", true);
            state.handle_named_key("ArrowDown", true);
        } else {
            state.handle_named_key("ArrowLeft", true);
            state.handle_named_key("ArrowRight", true);
        }

        state.update_sprite(delta);

        prop_assert_eq!(state.sprite.position, start);
    }

    #[test]
    fn manual_key_takes_over_from_autopilot(key in arb_key(), frames in 0usize..10) {
        let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(800.0, 600.0, 1.0));
        state.set_autopilot_enabled(true);
        for frame in 0..frames {
            state.advance_frame(frame as f64 * 700.0);
        }

        prop_assert!(state.handle_key_change(key.key_code(), true));

        prop_assert!(!state.autopilot.is_enabled());
        prop_assert_eq!(held(&state), vec![key]);
    }
}

// ── Autopilot ─────────────────────────────────────────────────────────

#[test]
fn autopilot_cycle_is_exact() {
    let steps = vec![
        AutopilotStep::new(&[DirectionKey::ArrowRight], 1.0),
        AutopilotStep::new(&[DirectionKey::ArrowDown], 0.5),
        AutopilotStep::new(&[DirectionKey::ArrowLeft, DirectionKey::ArrowUp], 0.25),
    ];
    let mut state = RunnerState::new(&config_with(steps), Viewport::new(800.0, 600.0, 1.0));
    state.set_autopilot_enabled(true);
    assert_eq!(held(&state), vec![DirectionKey::ArrowRight]);

    state.update_autopilot(1.0);
    assert_eq!(state.autopilot.index(), 1);
    assert_eq!(held(&state), vec![DirectionKey::ArrowDown]);

    state.update_autopilot(0.5);
    assert_eq!(state.autopilot.index(), 2);
    assert_eq!(held(&state), vec![DirectionKey::ArrowUp, DirectionKey::ArrowLeft]);

    state.update_autopilot(0.25);
    assert_eq!(state.autopilot.index(), 0);
    assert_eq!(held(&state), vec![DirectionKey::ArrowRight]);
}

#[test]
fn full_cycle_in_one_call_returns_to_start() {
    let steps = vec![
        AutopilotStep::new(&[DirectionKey::ArrowRight], 1.0),
        AutopilotStep::new(&[DirectionKey::ArrowDown], 1.0),
    ];
    let mut state = RunnerState::new(&config_with(steps), Viewport::new(800.0, 600.0, 1.0));
    state.set_autopilot_enabled(true);

    state.update_autopilot(2.0);

    assert_eq!(state.autopilot.index(), 0);
    assert_eq!(held(&state), vec![DirectionKey::ArrowRight]);
}

#[test]
fn reenable_resets_cursor() {
    let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(800.0, 600.0, 1.0));
    state.set_autopilot_enabled(true);
    state.update_autopilot(2.5);
    assert_ne!(state.autopilot.index(), 0);

    assert!(state.set_autopilot_enabled(false));
    assert!(!state.keys.any_held());
    assert!(state.set_autopilot_enabled(true));

    assert_eq!(state.autopilot.index(), 0);
    assert_eq!(state.autopilot.elapsed(), 0.0);
    assert_eq!(held(&state), vec![DirectionKey::ArrowRight]);
}

#[test]
fn resize_reclamps_without_input() {
    let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(1600.0, 1200.0, 1.0));
    state.sprite.position = Vec2::new(1500.0, 1100.0);

    state.handle_resize(320.0, 240.0, 1.5);

    let half = state.sprite.half();
    assert_eq!(state.sprite.position, Vec2::new(320.0 - half, 240.0 - half));
}

#[test]
fn toggle_scenario_matches_browser_flow() {
    let mut state = RunnerState::new(&RunnerConfig::default(), Viewport::new(1280.0, 720.0, 1.0));
    state.advance_frame(0.0);
    assert!(state.snapshot().keys.values().all(|held| !held));

    assert!(state.toggle_autopilot());
    state.advance_frame(100.0);
    let first = state.snapshot().active_key().map(str::to_string);
    assert!(first.is_some());

    let mut timestamp = 100.0;
    while timestamp < 1400.0 {
        timestamp += 16.0;
        state.advance_frame(timestamp);
    }
    let next = state.snapshot().active_key().map(str::to_string);
    assert!(next.is_some());
    assert_ne!(first, next);

    assert!(!state.toggle_autopilot());
    let snapshot = state.snapshot();
    assert!(!snapshot.autopilot.enabled);
    assert!(snapshot.keys.values().all(|held| !held));
}
