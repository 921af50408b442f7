//! Route `log` output to the browser console.

use std::sync::Once;

use log::{Level, LevelFilter};

static INIT: Once = Once::new();

/// Install the console logger. Debug mode enables step-by-step tracing;
/// otherwise only status lines and warnings are printed.
///
/// The backend accepts everything from this workspace's crates; verbosity is
/// set through the global max level so a later `start` can still change it.
pub fn init(debug: bool) {
    INIT.call_once(|| {
        wasm_logger::init(wasm_logger::Config::new(Level::Debug).module_prefix("em_"));
    });
    log::set_max_level(if debug { LevelFilter::Debug } else { LevelFilter::Info });
}
