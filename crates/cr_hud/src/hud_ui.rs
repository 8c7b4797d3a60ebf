use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use cr_core::{DirectionKey, RunnerState};

/// Label of the autopilot toggle.
pub const AUTOPILOT_LABEL: &str = "Autopilot";

/// One arrow in the held-key display.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyIndicator {
    pub key: DirectionKey,
    pub glyph: &'static str,
    pub held: bool,
}

/// What the HUD shows for the current state.
#[derive(Clone, Debug, PartialEq)]
pub struct HudView {
    /// Whether the autopilot toggle is shown at all.
    pub autopilot_available: bool,
    /// Pressed state of the toggle (the button's `aria-pressed`).
    pub autopilot_pressed: bool,
    /// "On" or "Off".
    pub autopilot_status: &'static str,
    pub keys: Vec<KeyIndicator>,
}

impl HudView {
    pub fn from_state(state: &RunnerState) -> Self {
        let pressed = state.autopilot.is_enabled();
        Self {
            autopilot_available: state.features().autopilot,
            autopilot_pressed: pressed,
            autopilot_status: if pressed { "On" } else { "Off" },
            keys: DirectionKey::all()
                .iter()
                .map(|key| KeyIndicator {
                    key: *key,
                    glyph: key.glyph(),
                    held: state.keys.is_held(*key),
                })
                .collect(),
        }
    }

    /// Value of the toggle's `aria-pressed` attribute.
    pub fn aria_pressed(&self) -> &'static str {
        if self.autopilot_pressed {
            "true"
        } else {
            "false"
        }
    }
}

/// System to render the HUD panel.
pub fn hud_ui_system(mut contexts: EguiContexts, mut state: ResMut<RunnerState>) {
    let view = HudView::from_state(&state);

    egui::Window::new("hud")
        .title_bar(false)
        .resizable(false)
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .show(contexts.ctx_mut(), |ui| {
            ui.label("Arrow keys to move");

            if view.autopilot_available {
                ui.horizontal(|ui| {
                    if ui.selectable_label(view.autopilot_pressed, AUTOPILOT_LABEL).clicked() {
                        state.toggle_autopilot();
                    }
                    ui.label(view.autopilot_status);
                });
            }

            ui.horizontal(|ui| {
                for indicator in &view.keys {
                    let text = egui::RichText::new(indicator.glyph).monospace();
                    if indicator.held {
                        ui.label(text.strong().color(egui::Color32::from_rgb(56, 189, 248)));
                    } else {
                        ui.label(text.weak());
                    }
                }
            });
        });
}
