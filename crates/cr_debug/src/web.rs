use wasm_bindgen::prelude::*;

use crate::handle::DebugHandle;

/// Name of the global object the browser test harness reads.
pub const GLOBAL_NAME: &str = "__CANVAS_RUNNER_DEBUG__";

/// Publish `window.__CANVAS_RUNNER_DEBUG__.getState()`.
///
/// `getState` returns the latest snapshot as a plain JS object, or `null`
/// before the first frame.
pub fn expose_on_window(handle: DebugHandle) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;

    let get_state = Closure::<dyn Fn() -> JsValue>::new(move || {
        handle
            .get_state()
            .and_then(|snapshot| serde_json::to_string(&snapshot).ok())
            .and_then(|json| js_sys::JSON::parse(&json).ok())
            .unwrap_or(JsValue::NULL)
    });

    let debug = js_sys::Object::new();
    js_sys::Reflect::set(&debug, &JsValue::from_str("getState"), get_state.as_ref())?;
    // Lives as long as the page.
    get_state.forget();

    js_sys::Reflect::set(&window, &JsValue::from_str(GLOBAL_NAME), &debug)?;
    Ok(())
}
