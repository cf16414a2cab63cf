pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Fire `f` once after `delay_ms` on the browser event loop.
/// Returns the timer handle so callers can cancel a pending invocation
/// (debounce idiom: clear the previous handle before scheduling).
pub(crate) fn set_timeout(f: impl FnOnce() + 'static, delay_ms: i32) -> Option<i32> {
    use wasm_bindgen::JsCast;

    let win = web_sys::window()?;
    win.set_timeout_with_callback_and_timeout_and_arguments_0(
        wasm_bindgen::closure::Closure::once_into_js(f)
            .as_ref()
            .unchecked_ref(),
        delay_ms,
    )
    .ok()
}

pub(crate) fn clear_timeout(handle: i32) {
    if let Some(win) = web_sys::window() {
        win.clear_timeout_with_handle(handle);
    }
}
