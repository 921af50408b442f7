//! Session orchestration
//!
//! One [`Session`] per page load. `start` gates on the URL, hides the widget
//! form, kicks off the widget loader and the field locator, and once both
//! inputs exist runs the retry driver that attaches the mirror and the
//! submission forwarder.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::config::MirrorConfig;
use crate::forwarder::SubmissionForwarder;
use crate::host::Host;
use crate::locator::{FieldLocator, LocatedFields};
use crate::mirror::MirrorController;
use crate::poll::{poll_until, PollBudget, PollTask, Probe};
use crate::types::{PageDecision, Triggers};
use crate::url_filter::UrlFilter;
use crate::widget::{start_widget, ReadySignal, WidgetLoader};

/// Snapshot of what the session has achieved so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStatus {
    /// None until `start` has run
    pub decision: Option<PageDecision>,
    pub widget_ready: bool,
    pub fields_located: bool,
    pub mirror_bound: bool,
    pub submission_triggers: Triggers,
    /// True while any poll loop is still running
    pub polling: bool,
}

impl SessionStatus {
    pub fn submission_bound(&self) -> bool {
        !self.submission_triggers.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.mirror_bound && self.submission_bound()
    }
}

struct Inner<H: Host> {
    host: Rc<H>,
    config: MirrorConfig,
    filter: UrlFilter,
    decision: Cell<Option<PageDecision>>,
    widget: RefCell<Option<ReadySignal>>,
    fields_located: Cell<bool>,
    locator_task: RefCell<Option<Rc<PollTask<H>>>>,
    retry_task: RefCell<Option<Rc<PollTask<H>>>>,
    mirror: MirrorController<H>,
    forwarder: SubmissionForwarder<H>,
}

pub struct Session<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> Session<H> {
    pub fn new(host: Rc<H>, config: MirrorConfig) -> Self {
        let filter = config.url_filter();
        let mirror = MirrorController::new(Rc::clone(&host), config.timing.settle_delay_ms);
        let forwarder = SubmissionForwarder::from_config(Rc::clone(&host), &config);

        Self {
            inner: Rc::new(Inner {
                host,
                config,
                filter,
                decision: Cell::new(None),
                widget: RefCell::new(None),
                fields_located: Cell::new(false),
                locator_task: RefCell::new(None),
                retry_task: RefCell::new(None),
                mirror,
                forwarder,
            }),
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.inner.config
    }

    /// Run the session for the current page. Only the first call does
    /// anything; later calls return the first decision.
    pub fn start(&self, loader: &dyn WidgetLoader) -> PageDecision {
        if let Some(decision) = self.inner.decision.get() {
            log::debug!("Session already started");
            return decision;
        }

        let inner = &self.inner;
        log::info!("Email mirror script initialized");

        let url = inner.host.current_url();
        let decision = inner.filter.classify(&url);
        inner.decision.set(Some(decision));

        match decision {
            PageDecision::Blocked => {
                log::warn!("Current URL is blocked. Email mirroring will not run.");
                return decision;
            }
            PageDecision::NotListed => {
                log::info!("Current URL is not in the allowed list. Email mirroring will not run.");
                return decision;
            }
            PageDecision::Allowed => log::debug!("URL is allowed. Proceeding"),
        }

        if inner.config.debug {
            log::debug!("Debug is on; HubSpot form left visible");
        } else {
            inner.host.inject_style(&inner.config.hide_stylesheet());
        }

        let signal = start_widget(
            &inner.host,
            loader,
            &inner.config.widget,
            inner.config.timing.widget_ready_timeout_ms,
        );
        *inner.widget.borrow_mut() = Some(signal);

        let timing = &inner.config.timing;
        let weak = Rc::downgrade(inner);
        let task = FieldLocator::from_config(&inner.config).start(
            &inner.host,
            PollBudget::new(timing.locator_interval_ms, timing.locator_max_attempts),
            move |fields| {
                if let Some(inner) = weak.upgrade() {
                    inner.fields_located.set(true);
                    start_retry_driver(&inner, fields);
                }
            },
        );
        *inner.locator_task.borrow_mut() = Some(task);

        decision
    }

    /// Stop all polling. Bindings already made stay in place.
    pub fn stop(&self) {
        for slot in [&self.inner.locator_task, &self.inner.retry_task] {
            if let Some(task) = slot.borrow().as_ref() {
                task.cancel();
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        let inner = &self.inner;
        let running = |slot: &RefCell<Option<Rc<PollTask<H>>>>| {
            slot.borrow().as_ref().is_some_and(|task| task.is_running())
        };

        SessionStatus {
            decision: inner.decision.get(),
            widget_ready: inner.widget.borrow().as_ref().is_some_and(ReadySignal::is_ready),
            fields_located: inner.fields_located.get(),
            mirror_bound: inner.mirror.is_bound(),
            submission_triggers: inner.forwarder.triggers(),
            polling: running(&inner.locator_task) || running(&inner.retry_task),
        }
    }
}

/// Attach mirror and forwarder each tick until both are bound.
fn start_retry_driver<H: Host>(inner: &Rc<Inner<H>>, fields: LocatedFields<H::Element>) {
    let timing = &inner.config.timing;
    let budget = PollBudget::new(timing.retry_interval_ms, timing.retry_max_attempts);

    let probe_inner = Rc::downgrade(inner);
    let exhausted_inner = Rc::downgrade(inner);

    let task = poll_until(
        &inner.host,
        budget,
        move |attempt| {
            let Some(inner) = probe_inner.upgrade() else {
                return Probe::Pending;
            };
            let mirror_done = inner.mirror.attach(&fields.native_input, &fields.widget_input);
            let form_done = inner.forwarder.try_attach();

            if mirror_done && form_done {
                Probe::Ready(())
            } else {
                log::debug!("Setup attempt {attempt} failed (mirror: {mirror_done}, form: {form_done})");
                Probe::Pending
            }
        },
        |()| log::debug!("All setups complete"),
        move |attempts| report_partial(&exhausted_inner, attempts),
    );
    *inner.retry_task.borrow_mut() = Some(task);
}

fn report_partial<H: Host>(inner: &Weak<Inner<H>>, attempts: u32) {
    let Some(inner) = inner.upgrade() else { return };
    let mut missing = Vec::new();
    if !inner.mirror.is_bound() {
        missing.push("email mirroring".to_string());
    }
    if !inner.forwarder.is_bound() {
        missing.push(format!("form submission ({:?})", inner.config.selectors.submit_button));
    }
    log::warn!(
        "Max attempts ({attempts}) reached without binding {}. Please verify selectors.",
        missing.join(" and ")
    );
}
