//! Native → widget value mirroring
//!
//! Every `input` event on the native field overwrites the widget field.
//! A pre-filled value (browser autofill) is copied once after a settle delay,
//! since the widget may still be initializing when the fields are found.
//! The value is copied as-is; nothing checks that it is an email.

use std::cell::RefCell;
use std::rc::Rc;

use crate::host::{Element, Host};
use crate::types::EventKind;

pub struct MirrorController<H: Host> {
    host: Rc<H>,
    settle_delay_ms: u32,
    bound: RefCell<Option<(H::Element, H::Element)>>,
}

impl<H: Host> MirrorController<H> {
    pub fn new(host: Rc<H>, settle_delay_ms: u32) -> Self {
        Self {
            host,
            settle_delay_ms,
            bound: RefCell::new(None),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound.borrow().is_some()
    }

    /// Bind `native` to `widget`. Returns true once a binding exists.
    ///
    /// Repeated calls never register a second listener. A different pair
    /// after the first binding is refused.
    pub fn attach(&self, native: &H::Element, widget: &H::Element) -> bool {
        if let Some((bound_native, bound_widget)) = self.bound.borrow().as_ref() {
            if bound_native != native || bound_widget != widget {
                log::debug!("Mirror already bound to another pair; ignoring");
            }
            return true;
        }

        log::debug!("Executing mirroring setup");

        native.add_listener(EventKind::Input, {
            let native = native.clone();
            let widget = widget.clone();
            Box::new(move |_| {
                let value = native.value();
                widget.set_value(&value);
                log::debug!("Mirroring: {value}");
            })
        });

        let copy_initial = {
            let native = native.clone();
            let widget = widget.clone();
            Box::new(move || {
                let value = native.value();
                if value.is_empty() {
                    log::debug!("Initial email value not found");
                } else {
                    widget.set_value(&value);
                    log::debug!("Detected initial email value. Added to HubSpot form: {value}");
                }
            })
        };
        if self.host.set_timeout(self.settle_delay_ms, copy_initial).is_none() {
            log::debug!("Could not schedule initial value copy");
        }

        *self.bound.borrow_mut() = Some((native.clone(), widget.clone()));
        log::info!("Real-time email mirroring setup complete");
        true
    }
}
