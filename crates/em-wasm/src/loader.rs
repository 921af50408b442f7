//! HubSpot embed script loader

use em_core::{WidgetConfig, WidgetLoader};
use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlScriptElement};

pub struct HubSpotLoader {
    document: Document,
}

impl HubSpotLoader {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn inject(&self, config: &WidgetConfig, on_ready: Box<dyn FnOnce()>) -> Result<(), JsValue> {
        let create = {
            let config = config.clone();
            move || {
                if let Err(e) = create_form(&config, on_ready) {
                    log::warn!("hbspt.forms.create failed: {e:?}");
                }
            }
        };

        let selector = format!("script[src=\"{}\"]", config.script_src);
        if let Some(existing) = self.document.query_selector(&selector)? {
            // Already on the page: create now if it has run, else on its load.
            if forms_api_available() {
                create();
            } else {
                let on_load = Closure::once_into_js(create);
                existing.add_event_listener_with_callback("load", on_load.unchecked_ref())?;
            }
            return Ok(());
        }

        let script: HtmlScriptElement = self.document.create_element("script")?.dyn_into()?;
        script.set_charset("utf-8");
        script.set_type("text/javascript");
        script.set_src(&config.script_src);

        let on_load = Closure::once_into_js(create);
        script.add_event_listener_with_callback("load", on_load.unchecked_ref())?;

        let src = config.script_src.clone();
        let on_error = Closure::once_into_js(move || {
            log::warn!("HubSpot embed script {src} failed to load");
        });
        script.add_event_listener_with_callback("error", on_error.unchecked_ref())?;

        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("Document has no head"))?;
        head.append_child(&script)?;
        Ok(())
    }
}

impl WidgetLoader for HubSpotLoader {
    fn load(&self, config: &WidgetConfig, on_ready: Box<dyn FnOnce()>) {
        if let Err(e) = self.inject(config, on_ready) {
            log::warn!("Could not load HubSpot embed script: {e:?}");
        }
    }
}

fn forms_api_available() -> bool {
    Reflect::get(&js_sys::global(), &"hbspt".into())
        .map(|hbspt| !hbspt.is_undefined())
        .unwrap_or(false)
}

/// `hbspt.forms.create({ region, portalId, formId, onFormReady })`
fn create_form(config: &WidgetConfig, on_ready: Box<dyn FnOnce()>) -> Result<(), JsValue> {
    let hbspt = Reflect::get(&js_sys::global(), &"hbspt".into())?;
    let forms = Reflect::get(&hbspt, &"forms".into())?;
    let create: Function = Reflect::get(&forms, &"create".into())?.dyn_into()?;

    let options = Object::new();
    Reflect::set(&options, &"region".into(), &JsValue::from_str(&config.region))?;
    Reflect::set(&options, &"portalId".into(), &JsValue::from_str(&config.portal_id))?;
    Reflect::set(&options, &"formId".into(), &JsValue::from_str(&config.form_id))?;

    let on_form_ready = Closure::once_into_js(move |_form: JsValue| on_ready());
    Reflect::set(&options, &"onFormReady".into(), &on_form_ready)?;

    create.call1(&forms, &options)?;
    Ok(())
}
