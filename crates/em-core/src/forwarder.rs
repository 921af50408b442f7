//! Native → hidden form submission forwarding
//!
//! Three native triggers submit the hidden form: a click on the submit
//! control, Enter inside the native form, and the native form's `submit`
//! event. One user action often fires several of them (Enter produces both a
//! keypress and a submit), so submissions landing within the debounce window
//! of the previous one are dropped.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::MirrorConfig;
use crate::host::{Element, Host};
use crate::types::{EventKind, Triggers};

/// Elements the forwarder binds to.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionTargets<E> {
    /// Form containing the submit control; Enter and submit are only bound if present
    pub native_form: Option<E>,
    pub submit_control: E,
    pub hidden_form: E,
}

/// Submits the hidden form, collapsing bursts.
struct SubmitGate<H: Host> {
    host: Rc<H>,
    hidden_form: H::Element,
    debounce_ms: f64,
    last_submit: Cell<Option<f64>>,
}

impl<H: Host> SubmitGate<H> {
    fn submit(&self, trigger: &str) {
        let now = self.host.now_ms();
        if let Some(last) = self.last_submit.get() {
            if now - last < self.debounce_ms {
                log::debug!("{trigger}: hidden form submitted {}ms ago, skipping", now - last);
                return;
            }
        }
        self.last_submit.set(Some(now));
        log::debug!("{trigger}: submitting the hidden HubSpot form");
        self.hidden_form.submit();
    }
}

pub struct SubmissionForwarder<H: Host> {
    host: Rc<H>,
    submit_selector: String,
    hidden_form_selector: String,
    debounce_ms: u32,
    bound: Cell<Triggers>,
}

impl<H: Host> SubmissionForwarder<H> {
    pub fn new(host: Rc<H>, submit_selector: &str, hidden_form_selector: &str, debounce_ms: u32) -> Self {
        Self {
            host,
            submit_selector: submit_selector.to_string(),
            hidden_form_selector: hidden_form_selector.to_string(),
            debounce_ms,
            bound: Cell::new(Triggers::empty()),
        }
    }

    pub fn from_config(host: Rc<H>, config: &MirrorConfig) -> Self {
        Self::new(
            host,
            &config.selectors.submit_button,
            &config.hidden_form_selector(),
            config.timing.submit_debounce_ms,
        )
    }

    pub fn is_bound(&self) -> bool {
        !self.bound.get().is_empty()
    }

    /// Triggers currently bound.
    pub fn triggers(&self) -> Triggers {
        self.bound.get()
    }

    /// Look up the submit control, its form and the hidden form.
    pub fn resolve(&self) -> Option<SubmissionTargets<H::Element>> {
        let submit_control = self.host.query(&self.submit_selector);
        let hidden_form = self.host.query(&self.hidden_form_selector);

        log::debug!(
            "Form submit button {}, HubSpot form {}",
            if submit_control.is_some() { "found" } else { "not found" },
            if hidden_form.is_some() { "found" } else { "not found" },
        );

        let submit_control = submit_control?;
        let hidden_form = hidden_form?;
        let native_form = self
            .host
            .query_all("form")
            .into_iter()
            .find(|form| *form != hidden_form && form.contains_match(&self.submit_selector));
        if native_form.is_none() {
            log::debug!("Did not find target form; only the click trigger will be bound");
        }

        Some(SubmissionTargets {
            native_form,
            submit_control,
            hidden_form,
        })
    }

    /// Resolve targets from the page and attach. Returns true once bound.
    pub fn try_attach(&self) -> bool {
        if self.is_bound() {
            return true;
        }
        match self.resolve() {
            Some(targets) => self.attach(targets),
            None => {
                log::debug!("Target submit button or HubSpot form not found");
                false
            }
        }
    }

    /// Bind the triggers to `targets`. Repeated calls register nothing new.
    pub fn attach(&self, targets: SubmissionTargets<H::Element>) -> bool {
        if self.is_bound() {
            return true;
        }

        let gate = Rc::new(SubmitGate {
            host: Rc::clone(&self.host),
            hidden_form: targets.hidden_form.clone(),
            debounce_ms: f64::from(self.debounce_ms),
            last_submit: Cell::new(None),
        });

        let mut triggers = Triggers::CLICK;
        targets.submit_control.add_listener(EventKind::Click, {
            let gate = Rc::clone(&gate);
            Box::new(move |_| gate.submit("Target form submit button clicked"))
        });

        if let Some(form) = &targets.native_form {
            form.add_listener(EventKind::KeyPress, {
                let gate = Rc::clone(&gate);
                Box::new(move |event| {
                    if event.is_enter() {
                        gate.submit("Enter key pressed");
                    }
                })
            });
            form.add_listener(EventKind::Submit, {
                let gate = Rc::clone(&gate);
                Box::new(move |_| gate.submit("Form submit event triggered"))
            });
            triggers |= Triggers::ENTER | Triggers::SUBMIT;
        }

        self.bound.set(triggers);
        log::debug!("Form submission setup complete ({triggers:?})");
        true
    }
}
