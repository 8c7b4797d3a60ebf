//! Browser HUD: the same view as the egui panel, as plain DOM nodes so page
//! tests can find the toggle by role and read its `aria-pressed`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use cr_core::RunnerState;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::hud_ui::{HudView, AUTOPILOT_LABEL};

/// Class of the element holding "On"/"Off".
pub const STATUS_CLASS: &str = "hud__autopilot-status";

/// Mounted HUD nodes. Not `Send`, so kept as a non-send resource.
pub struct DomHud {
    button: Element,
    status: Element,
    keys: Vec<Element>,
    clicked: Arc<AtomicBool>,
}

impl DomHud {
    pub fn mount(view: &HudView) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

        let root = element(&document, "div", "hud")?;

        let button = element(&document, "button", "hud__autopilot")?;
        button.set_attribute("type", "button")?;
        let label = element(&document, "span", "hud__autopilot-label")?;
        label.set_text_content(Some(AUTOPILOT_LABEL));
        let status = element(&document, "span", STATUS_CLASS)?;
        button.append_child(&label)?;
        button.append_child(&status)?;

        let key_row = element(&document, "div", "hud__keys")?;
        let mut keys = Vec::with_capacity(view.keys.len());
        for indicator in &view.keys {
            let key = element(&document, "span", "hud__key")?;
            key.set_attribute("data-key", indicator.key.name())?;
            key.set_text_content(Some(indicator.glyph));
            key_row.append_child(&key)?;
            keys.push(key);
        }

        root.append_child(&button)?;
        root.append_child(&key_row)?;
        body.append_child(&root)?;

        let clicked = Arc::new(AtomicBool::new(false));
        let flag = clicked.clone();
        let on_click = Closure::<dyn Fn()>::new(move || flag.store(true, Ordering::Release));
        button.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();

        let hud = Self {
            button,
            status,
            keys,
            clicked,
        };
        hud.show(view)?;
        Ok(hud)
    }

    /// Whether the toggle was clicked since the last call.
    fn take_click(&self) -> bool {
        self.clicked.swap(false, Ordering::AcqRel)
    }

    fn show(&self, view: &HudView) -> Result<(), JsValue> {
        if view.autopilot_available {
            self.button.remove_attribute("hidden")?;
        } else {
            self.button.set_attribute("hidden", "")?;
        }
        self.button.set_attribute("aria-pressed", view.aria_pressed())?;
        self.status.set_text_content(Some(view.autopilot_status));

        for (node, indicator) in self.keys.iter().zip(&view.keys) {
            node.set_attribute("data-held", if indicator.held { "true" } else { "false" })?;
        }
        Ok(())
    }
}

fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    Ok(element)
}

/// Mount the DOM HUD once the runner state exists.
pub fn mount_dom_hud(world: &mut World) {
    let Some(state) = world.get_resource::<RunnerState>() else { return };
    if !state.features().hud {
        return;
    }

    let view = HudView::from_state(state);

    match DomHud::mount(&view) {
        Ok(hud) => {
            world.insert_non_send_resource(hud);
            info!("DOM HUD mounted");
        }
        Err(err) => error!("Failed to mount DOM HUD: {:?}", err),
    }
}

/// Apply toggle clicks and mirror the current state into the DOM.
pub fn dom_hud_system(hud: Option<NonSend<DomHud>>, mut state: ResMut<RunnerState>) {
    let Some(hud) = hud else { return };

    if hud.take_click() {
        state.toggle_autopilot();
    }
    if let Err(err) = hud.show(&HudView::from_state(&state)) {
        warn!("DOM HUD update failed: {:?}", err);
    }
}
