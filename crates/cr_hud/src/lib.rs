use bevy::prelude::*;
use cr_core::RunnerState;

#[cfg(target_arch = "wasm32")]
pub mod dom;
pub mod hud_ui;

pub use hud_ui::{HudView, KeyIndicator};

/// HUD plugin for Canvas Runner.
/// Autopilot toggle and held-key display: egui on desktop, DOM nodes in the browser.
pub struct CrHudPlugin;

impl Plugin for CrHudPlugin {
    #[cfg(not(target_arch = "wasm32"))]
    fn build(&self, app: &mut App) {
        use bevy_egui::EguiPlugin;

        // Only add EguiPlugin if not already added
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin);
        }

        app.add_systems(Update, hud_ui::hud_ui_system.run_if(hud_enabled));
    }

    #[cfg(target_arch = "wasm32")]
    fn build(&self, app: &mut App) {
        app.add_systems(PostStartup, dom::mount_dom_hud)
            .add_systems(Update, dom::dom_hud_system.run_if(hud_enabled));
    }
}

fn hud_enabled(state: Option<Res<RunnerState>>) -> bool {
    state.is_some_and(|state| state.features().hud)
}
