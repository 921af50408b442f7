//! Host abstraction
//!
//! The core never touches the browser directly. The wasm bindings provide a
//! `web-sys` backed [`Host`]; tests use an in-memory fake with a virtual
//! clock.

use crate::types::{DomEvent, EventKind};

/// Handle returned by the host timer functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub i32);

/// Event listener callback.
pub type Listener = Box<dyn FnMut(&DomEvent)>;

/// A DOM element reference.
///
/// Handles are cheap clones that all refer to the same live node.
pub trait Element: Clone + PartialEq + 'static {
    /// Current `value` of an input. Empty for non-input elements.
    fn value(&self) -> String;

    /// Overwrite the `value` of an input. No-op for non-input elements.
    fn set_value(&self, value: &str);

    /// True if this element or one of its ancestors matches `selector`.
    fn is_within(&self, selector: &str) -> bool;

    /// True if a descendant of this element matches `selector`.
    fn contains_match(&self, selector: &str) -> bool;

    /// Register a listener for `kind`. Listeners live for the page lifetime.
    fn add_listener(&self, kind: EventKind, listener: Listener);

    /// Submit this element as a form. No-op for non-form elements.
    fn submit(&self);
}

/// Page environment: document queries, timers and the clock.
pub trait Host: 'static {
    type Element: Element;

    /// Full URL of the current page.
    fn current_url(&self) -> String;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// First element matching `selector`.
    fn query(&self, selector: &str) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }

    /// Append a stylesheet to the document head.
    fn inject_style(&self, css: &str);

    /// Milliseconds since an arbitrary epoch. Monotonic within a page.
    fn now_ms(&self) -> f64;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Option<TimerId>;

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Option<TimerId>;

    /// Clear a timeout or interval. Unknown ids are ignored.
    fn clear_timer(&self, id: TimerId);
}
