use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use crate::systems::suppresses_default;

/// Cancel the browser's default action (page scrolling) for arrow keys.
///
/// winit's own `prevent_default_event_handling` would swallow every key,
/// including reload and devtools shortcuts, so it stays off and this
/// listener filters instead.
pub fn install_key_filter() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;

    let filter = Closure::<dyn Fn(KeyboardEvent)>::new(|event: KeyboardEvent| {
        if suppresses_default(&event.key()) {
            event.prevent_default();
        }
    });
    for kind in ["keydown", "keyup"] {
        window.add_event_listener_with_callback(kind, filter.as_ref().unchecked_ref())?;
    }
    // Lives as long as the page.
    filter.forget();
    Ok(())
}
