//! Email input discovery
//!
//! The native input is the first element in document order that matches the
//! configured selector and is not inside the widget root. The widget input is
//! the email input of the form tagged with the widget's form id. Both must be
//! present in the same poll tick.

use std::rc::Rc;

use crate::config::MirrorConfig;
use crate::host::{Element, Host};
use crate::poll::{poll_until, PollBudget, PollTask, Probe};

/// The two inputs the mirror links.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedFields<E> {
    pub native_input: E,
    pub widget_input: E,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLocator {
    native_selector: String,
    widget_root_selector: String,
    widget_input_selector: String,
}

impl FieldLocator {
    pub fn new(native_selector: &str, widget_root_selector: &str, widget_input_selector: &str) -> Self {
        Self {
            native_selector: native_selector.to_string(),
            widget_root_selector: widget_root_selector.to_string(),
            widget_input_selector: widget_input_selector.to_string(),
        }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(
            &config.selectors.email_field,
            &config.selectors.widget_root,
            &config.widget.email_input_selector(),
        )
    }

    pub fn find_native<H: Host>(&self, host: &H) -> Option<H::Element> {
        host.query_all(&self.native_selector)
            .into_iter()
            .find(|el| !el.is_within(&self.widget_root_selector))
    }

    pub fn find_widget<H: Host>(&self, host: &H) -> Option<H::Element> {
        host.query(&self.widget_input_selector)
    }

    /// One discovery pass.
    pub fn locate<H: Host>(&self, host: &H) -> Option<LocatedFields<H::Element>> {
        let native = self.find_native(host);
        let widget = self.find_widget(host);
        log::debug!(
            "Waiting for email fields (native: {}, widget: {})",
            native.is_some(),
            widget.is_some()
        );

        Some(LocatedFields {
            native_input: native?,
            widget_input: widget?,
        })
    }

    /// Poll until both inputs exist, then hand them to `on_found`.
    pub fn start<H, F>(self, host: &Rc<H>, budget: PollBudget, on_found: F) -> Rc<PollTask<H>>
    where
        H: Host,
        F: FnOnce(LocatedFields<H::Element>) + 'static,
    {
        let probe_host = Rc::clone(host);
        let selector = self.native_selector.clone();
        poll_until(
            host,
            budget,
            move |_| match self.locate(&*probe_host) {
                Some(fields) => Probe::Ready(fields),
                None => Probe::Pending,
            },
            move |fields| {
                log::debug!("Found target and HubSpot email fields");
                on_found(fields);
            },
            move |attempts| {
                log::warn!(
                    "Email fields not found after {attempts} attempts; mirroring disabled. \
                     Check that {selector:?} matches the page's email input"
                );
            },
        )
    }
}
