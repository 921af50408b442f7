//! In-memory host for unit tests.
//!
//! Elements match a selector when it was listed for them at creation, so
//! tests spell out exactly which selectors resolve. Timers run on a virtual
//! clock advanced with [`FakeHost::advance`].

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::rc::{Rc, Weak};

use crate::host::{Element, Host, Listener, TimerId};
use crate::types::{DomEvent, EventKind};

struct Node {
    id: u32,
    selectors: HashSet<String>,
    parent: Option<FakeElement>,
    children: RefCell<Vec<Weak<Node>>>,
    value: RefCell<String>,
    value_writes: Cell<u32>,
    submits: Cell<u32>,
    listeners: RefCell<Vec<(EventKind, Listener)>>,
}

#[derive(Clone)]
pub struct FakeElement(Rc<Node>);

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for FakeElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FakeElement#{}", self.0.id)
    }
}

impl FakeElement {
    fn matches(&self, selector: &str) -> bool {
        self.0.selectors.contains(selector)
    }

    fn children(&self) -> Vec<FakeElement> {
        self.0
            .children
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .map(FakeElement)
            .collect()
    }

    /// Number of `set_value` calls made by the code under test.
    pub fn value_writes(&self) -> u32 {
        self.0.value_writes.get()
    }

    pub fn submits(&self) -> u32 {
        self.0.submits.get()
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.0.listeners.borrow().iter().filter(|(k, _)| *k == kind).count()
    }

    /// Simulate the user typing: set the value then fire `input`.
    pub fn type_value(&self, value: &str) {
        *self.0.value.borrow_mut() = value.to_string();
        self.dispatch(&DomEvent::new(EventKind::Input));
    }

    /// Set the value without firing events (autofill before binding).
    pub fn prefill(&self, value: &str) {
        *self.0.value.borrow_mut() = value.to_string();
    }

    /// Fire `event` on this element and bubble it up the ancestor chain.
    pub fn dispatch(&self, event: &DomEvent) {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            node.fire_local(event);
            current = node.0.parent.clone();
        }
    }

    fn fire_local(&self, event: &DomEvent) {
        let mut listeners = std::mem::take(&mut *self.0.listeners.borrow_mut());
        for (kind, listener) in listeners.iter_mut() {
            if *kind == event.kind {
                listener(event);
            }
        }
        let mut slot = self.0.listeners.borrow_mut();
        listeners.append(&mut slot);
        *slot = listeners;
    }
}

impl Element for FakeElement {
    fn value(&self) -> String {
        self.0.value.borrow().clone()
    }

    fn set_value(&self, value: &str) {
        *self.0.value.borrow_mut() = value.to_string();
        self.0.value_writes.set(self.0.value_writes.get() + 1);
    }

    fn is_within(&self, selector: &str) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.matches(selector) {
                return true;
            }
            current = node.0.parent.clone();
        }
        false
    }

    fn contains_match(&self, selector: &str) -> bool {
        self.children()
            .iter()
            .any(|child| child.matches(selector) || child.contains_match(selector))
    }

    fn add_listener(&self, kind: EventKind, listener: Listener) {
        self.0.listeners.borrow_mut().push((kind, listener));
    }

    fn submit(&self) {
        self.0.submits.set(self.0.submits.get() + 1);
    }
}

enum TimerCallback {
    Once(Box<dyn FnOnce()>),
    Repeat(Box<dyn FnMut()>),
}

struct Timer {
    due: u64,
    period: Option<u64>,
    callback: Option<TimerCallback>,
}

pub struct FakeHost {
    url: String,
    elements: RefCell<Vec<FakeElement>>,
    styles: RefCell<Vec<String>>,
    now: Cell<u64>,
    next_id: Cell<i32>,
    timers: RefCell<BTreeMap<i32, Timer>>,
}

impl FakeHost {
    pub fn new(url: &str) -> Rc<Self> {
        Rc::new(Self {
            url: url.to_string(),
            elements: RefCell::new(Vec::new()),
            styles: RefCell::new(Vec::new()),
            now: Cell::new(0),
            next_id: Cell::new(1),
            timers: RefCell::new(BTreeMap::new()),
        })
    }

    /// Append an element matching `selectors` under `parent`.
    pub fn add(&self, selectors: &[&str], parent: Option<&FakeElement>) -> FakeElement {
        let element = FakeElement(Rc::new(Node {
            id: self.elements.borrow().len() as u32,
            selectors: selectors.iter().map(|s| s.to_string()).collect(),
            parent: parent.cloned(),
            children: RefCell::new(Vec::new()),
            value: RefCell::new(String::new()),
            value_writes: Cell::new(0),
            submits: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }));
        if let Some(parent) = parent {
            parent.0.children.borrow_mut().push(Rc::downgrade(&element.0));
        }
        self.elements.borrow_mut().push(element.clone());
        element
    }

    pub fn styles(&self) -> Vec<String> {
        self.styles.borrow().clone()
    }

    pub fn active_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Run every timer due within the next `ms` milliseconds, in order.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        loop {
            let next = self
                .timers
                .borrow()
                .iter()
                .filter(|(_, t)| t.due <= target)
                .min_by_key(|(id, t)| (t.due, **id))
                .map(|(id, t)| (*id, t.due));
            let Some((id, due)) = next else { break };

            self.now.set(due);
            let callback = self
                .timers
                .borrow_mut()
                .get_mut(&id)
                .and_then(|t| t.callback.take());

            match callback {
                Some(TimerCallback::Once(f)) => {
                    self.timers.borrow_mut().remove(&id);
                    f();
                }
                Some(TimerCallback::Repeat(mut f)) => {
                    f();
                    // The callback may have cleared its own timer.
                    if let Some(timer) = self.timers.borrow_mut().get_mut(&id) {
                        timer.due += timer.period.unwrap_or(1);
                        timer.callback = Some(TimerCallback::Repeat(f));
                    }
                }
                None => {
                    self.timers.borrow_mut().remove(&id);
                }
            }
        }
        self.now.set(target);
    }

    fn schedule(&self, delay: u32, period: Option<u32>, callback: TimerCallback) -> Option<TimerId> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.timers.borrow_mut().insert(
            id,
            Timer {
                due: self.now.get() + u64::from(delay.max(1)),
                period: period.map(|p| u64::from(p.max(1))),
                callback: Some(callback),
            },
        );
        Some(TimerId(id))
    }
}

impl Host for FakeHost {
    type Element = FakeElement;

    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn query_all(&self, selector: &str) -> Vec<FakeElement> {
        self.elements
            .borrow()
            .iter()
            .filter(|el| el.matches(selector))
            .cloned()
            .collect()
    }

    fn inject_style(&self, css: &str) {
        self.styles.borrow_mut().push(css.to_string());
    }

    fn now_ms(&self) -> f64 {
        self.now.get() as f64
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Option<TimerId> {
        self.schedule(delay_ms, None, TimerCallback::Once(callback))
    }

    fn set_interval(&self, period_ms: u32, callback: Box<dyn FnMut()>) -> Option<TimerId> {
        self.schedule(period_ms, Some(period_ms), TimerCallback::Repeat(callback))
    }

    fn clear_timer(&self, id: TimerId) {
        self.timers.borrow_mut().remove(&id.0);
    }
}
