//! WebAssembly bindings for Email Mirror
//!
//! Load the module after the HubSpot tracking code and call `start` with a
//! JSON config, or define `window.EMAIL_MIRROR_CONFIG` before loading and the
//! module starts itself.

use std::cell::RefCell;
use std::rc::Rc;

use em_core::{MirrorConfig, Session, UrlFilter};
use wasm_bindgen::prelude::*;

mod host;
mod loader;
mod logger;

pub use host::{BrowserElement, BrowserHost};
pub use loader::HubSpotLoader;

thread_local! {
    static SESSION: RefCell<Option<Session<BrowserHost>>> = const { RefCell::new(None) };
}

const GLOBAL_CONFIG: &str = "EMAIL_MIRROR_CONFIG";

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();

    let Ok(config) = js_sys::Reflect::get(&js_sys::global(), &GLOBAL_CONFIG.into()) else {
        return;
    };
    if config.is_undefined() || config.is_null() {
        return;
    }

    let json = match js_sys::JSON::stringify(&config) {
        Ok(json) => String::from(json),
        Err(_) => {
            logger::init(false);
            log::error!("{GLOBAL_CONFIG} is not serializable");
            return;
        }
    };
    if let Err(e) = start(&json) {
        log::error!("Email mirror did not start: {}", e.as_string().unwrap_or_default());
    }
}

/// Start mirroring for this page. Returns the URL decision
/// (`allowed`, `blocked` or `not_listed`). Later calls return the first
/// decision without restarting.
#[wasm_bindgen]
pub fn start(config_json: &str) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let config = match MirrorConfig::from_json(config_json) {
        Ok(config) => config,
        Err(e) => {
            logger::init(false);
            return Err(JsValue::from_str(&format!("Invalid configuration: {e}")));
        }
    };

    SESSION.with(|slot| {
        if let Some(decision) = slot.borrow().as_ref().and_then(|s| s.status().decision) {
            return Ok(decision.as_str().to_string());
        }

        logger::init(config.debug);

        let host = Rc::new(
            BrowserHost::new().ok_or_else(|| JsValue::from_str("No window or document available"))?,
        );
        let loader = HubSpotLoader::new(host.document().clone());
        let session = Session::new(host, config);
        let decision = session.start(&loader);

        *slot.borrow_mut() = Some(session);
        Ok(decision.as_str().to_string())
    })
}

#[wasm_bindgen]
pub fn is_running() -> bool {
    SESSION.with(|slot| slot.borrow().as_ref().is_some_and(|s| s.status().polling))
}

/// Stop any polling still in progress. Bindings already made stay active.
#[wasm_bindgen]
pub fn stop() {
    SESSION.with(|slot| {
        if let Some(session) = slot.borrow().as_ref() {
            session.stop();
        }
    });
}

#[wasm_bindgen]
pub fn status() -> JsValue {
    let result = js_sys::Object::new();
    let status = SESSION.with(|slot| slot.borrow().as_ref().map(Session::status));

    let Some(status) = status else {
        let _ = js_sys::Reflect::set(&result, &"started".into(), &JsValue::from(false));
        return result.into();
    };

    let decision = status.decision.map(|d| d.as_str()).unwrap_or("");
    let _ = js_sys::Reflect::set(&result, &"started".into(), &JsValue::from(true));
    let _ = js_sys::Reflect::set(&result, &"decision".into(), &JsValue::from_str(decision));
    let _ = js_sys::Reflect::set(&result, &"widgetReady".into(), &JsValue::from(status.widget_ready));
    let _ = js_sys::Reflect::set(&result, &"fieldsLocated".into(), &JsValue::from(status.fields_located));
    let _ = js_sys::Reflect::set(&result, &"mirrorBound".into(), &JsValue::from(status.mirror_bound));
    let _ = js_sys::Reflect::set(&result, &"submissionBound".into(), &JsValue::from(status.submission_bound()));
    let _ = js_sys::Reflect::set(&result, &"polling".into(), &JsValue::from(status.polling));
    result.into()
}

/// Check `url` against wildcard allow/block lists (arrays of strings).
#[wasm_bindgen]
pub fn is_url_allowed(url: &str, allowed: JsValue, blocked: JsValue) -> bool {
    UrlFilter::new(js_strings(&allowed), js_strings(&blocked)).is_allowed(url)
}

/// String entries of a JS array. Anything that is not an array, a bare
/// string included, counts as an empty list.
fn js_strings(value: &JsValue) -> Vec<String> {
    value
        .dyn_ref::<js_sys::Array>()
        .map(|array| array.iter().filter_map(|v| v.as_string()).collect())
        .unwrap_or_default()
}
