//! `web-sys` implementation of the core host traits.

use std::cell::RefCell;
use std::collections::HashMap;

use em_core::host::Listener;
use em_core::{DomEvent, Element, EventKind, Host, TimerId};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlFormElement, HtmlInputElement, KeyboardEvent, Window};

// =============================================================================
// Element
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserElement(web_sys::Element);

impl BrowserElement {
    pub fn new(element: web_sys::Element) -> Self {
        Self(element)
    }

    pub fn as_element(&self) -> &web_sys::Element {
        &self.0
    }
}

impl Element for BrowserElement {
    fn value(&self) -> String {
        self.0
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn is_within(&self, selector: &str) -> bool {
        matches!(self.0.closest(selector), Ok(Some(_)))
    }

    fn contains_match(&self, selector: &str) -> bool {
        matches!(self.0.query_selector(selector), Ok(Some(_)))
    }

    fn add_listener(&self, kind: EventKind, mut listener: Listener) {
        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event: web_sys::Event| {
            let key = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key);
            listener(&DomEvent { kind, key });
        }));

        if let Err(e) = self
            .0
            .add_event_listener_with_callback(kind.as_str(), callback.as_ref().unchecked_ref())
        {
            log::debug!("addEventListener({}) failed: {e:?}", kind.as_str());
        }

        // Listeners live for the page lifetime
        callback.forget();
    }

    fn submit(&self) {
        let Some(form) = self.0.dyn_ref::<HtmlFormElement>() else {
            log::debug!("Submit target is not a form element");
            return;
        };

        // requestSubmit runs the widget's own validation and submit handlers.
        if form.request_submit().is_err() {
            if let Err(e) = form.submit() {
                log::warn!("Hidden form submission failed: {e:?}");
            }
        }
    }
}

// =============================================================================
// Host
// =============================================================================

pub struct BrowserHost {
    window: Window,
    document: Document,
    intervals: RefCell<HashMap<i32, Closure<dyn FnMut()>>>,
}

impl BrowserHost {
    /// None outside a document context (workers, node).
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            intervals: RefCell::new(HashMap::new()),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Host for BrowserHost {
    type Element = BrowserElement;

    fn current_url(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn query_all(&self, selector: &str) -> Vec<BrowserElement> {
        let list = match self.document.query_selector_all(selector) {
            Ok(list) => list,
            Err(e) => {
                log::debug!("Invalid selector {selector:?}: {e:?}");
                return Vec::new();
            }
        };

        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(BrowserElement)
            .collect()
    }

    fn query(&self, selector: &str) -> Option<BrowserElement> {
        self.document.query_selector(selector).ok().flatten().map(BrowserElement)
    }

    fn inject_style(&self, css: &str) {
        let Ok(style) = self.document.create_element("style") else {
            log::debug!("Could not create style element");
            return;
        };
        style.set_text_content(Some(css));

        let parent = self
            .document
            .head()
            .map(web_sys::Node::from)
            .or_else(|| self.document.document_element().map(web_sys::Node::from));
        match parent {
            Some(parent) => {
                if let Err(e) = parent.append_child(&style) {
                    log::debug!("Could not append style element: {e:?}");
                }
            }
            None => log::debug!("Document has no head to style"),
        }
    }

    fn now_ms(&self) -> f64 {
        // Wall-clock time only where the Performance API is missing.
        self.window
            .performance()
            .map_or_else(js_sys::Date::now, |performance| performance.now())
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Option<TimerId> {
        // Frees itself after the single call
        let callback = Closure::once_into_js(move || callback());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay_ms.min(i32::MAX as u32) as i32,
            )
            .map(TimerId)
            .map_err(|e| log::debug!("setTimeout failed: {e:?}"))
            .ok()
    }

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Option<TimerId> {
        let callback = Closure::<dyn FnMut()>::wrap(callback);
        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                period_ms.min(i32::MAX as u32) as i32,
            )
            .map_err(|e| log::debug!("setInterval failed: {e:?}"))
            .ok()?;

        self.intervals.borrow_mut().insert(id, callback);
        Some(TimerId(id))
    }

    fn clear_timer(&self, id: TimerId) {
        // Timeouts and intervals share one id pool.
        self.window.clear_interval_with_handle(id.0);
        self.window.clear_timeout_with_handle(id.0);
        let closure = self.intervals.borrow_mut().remove(&id.0);
        drop(closure);
    }
}
