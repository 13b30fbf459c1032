pub mod runner;

pub use runner::LabRunner;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<LabRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the runner. Returns `None` before `lab_init`.
fn with_runner<R>(f: impl FnOnce(&mut LabRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        borrow.as_mut().map(f)
    })
}

/// Create the lab. `config_json` may be omitted or partial.
/// Returns an empty string on success, otherwise the parse error.
#[wasm_bindgen]
pub fn lab_init(config_json: Option<String>) -> String {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("tubelab: logger already initialized"));
    }

    match LabRunner::from_config_json(config_json.as_deref()) {
        Ok(runner) => {
            RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
            log::info!("tubelab: initialized");
            String::new()
        }
        Err(err) => {
            log::warn!("tubelab: init failed: {}", err);
            err.to_string()
        }
    }
}

#[wasm_bindgen]
pub fn lab_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

/// Apply a JSON command such as `{"type":"start_reaction"}`.
/// Returns an empty string on success, otherwise the rejection reason.
#[wasm_bindgen]
pub fn lab_command(json: &str) -> String {
    with_runner(|r| r.command(json)).unwrap_or_else(|| "not_initialized".to_string())
}

#[wasm_bindgen]
pub fn lab_snapshot() -> String {
    with_runner(|r| r.snapshot_json()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn lab_chemicals() -> String {
    with_runner(|r| r.chemicals_json()).unwrap_or_default()
}

// ---- Signal buffer accessors ----

/// Copy of the signal buffer for the last tick.
#[wasm_bindgen]
pub fn lab_signals() -> js_sys::Float32Array {
    with_runner(|r| js_sys::Float32Array::from(r.signals()))
        .unwrap_or_else(|| js_sys::Float32Array::new_with_length(0))
}

#[wasm_bindgen]
pub fn get_signals_ptr() -> *const f32 {
    with_runner(|r| r.signals_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_signals_len() -> u32 {
    with_runner(|r| r.signals_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_protocol_version() -> f32 {
    tubelab_engine::PROTOCOL_VERSION
}

/// Tear the lab down. The final stop signals stay readable until the next init.
#[wasm_bindgen]
pub fn lab_dispose() {
    if with_runner(|r| r.dispose()).is_some() {
        log::info!("tubelab: disposed");
    }
}
