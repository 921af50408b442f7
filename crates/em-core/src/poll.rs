//! Poll-until-ready utility
//!
//! Every wait in the crate is "run a probe on an interval until it succeeds
//! or an attempt ceiling is reached". [`poll_until`] owns the single interval
//! timer for one such wait and cancels it exactly once.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::host::{Host, TimerId};

/// Interval and attempt ceiling for one poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub interval_ms: u32,
    pub max_attempts: u32,
}

impl PollBudget {
    pub fn new(interval_ms: u32, max_attempts: u32) -> Self {
        Self {
            interval_ms,
            max_attempts,
        }
    }
}

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Ready(T),
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Running,
    Ready,
    Exhausted,
    Cancelled,
}

/// A running (or finished) poll loop.
pub struct PollTask<H: Host> {
    host: Rc<H>,
    timer: Cell<Option<TimerId>>,
    attempts: Cell<u32>,
    state: Cell<PollState>,
}

impl<H: Host> PollTask<H> {
    pub fn state(&self) -> PollState {
        self.state.get()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }

    pub fn is_running(&self) -> bool {
        self.state.get() == PollState::Running
    }

    /// Stop the loop. Safe to call any number of times.
    pub fn cancel(&self) {
        self.finish(PollState::Cancelled);
    }

    fn finish(&self, state: PollState) {
        if let Some(id) = self.timer.take() {
            self.host.clear_timer(id);
        }
        if self.state.get() == PollState::Running {
            self.state.set(state);
        }
    }
}

/// Start polling `probe` every `budget.interval_ms`.
///
/// The first probe runs one interval after the call. `on_ready` runs once
/// with the probe's value; `on_exhausted` runs once if `max_attempts`
/// probes all returned [`Probe::Pending`]. If the host refuses to create
/// the timer the task is returned already exhausted, without calling
/// either callback.
pub fn poll_until<H, T, P, R, E>(
    host: &Rc<H>,
    budget: PollBudget,
    probe: P,
    on_ready: R,
    on_exhausted: E,
) -> Rc<PollTask<H>>
where
    H: Host,
    T: 'static,
    P: FnMut(u32) -> Probe<T> + 'static,
    R: FnOnce(T) + 'static,
    E: FnOnce(u32) + 'static,
{
    let task = Rc::new(PollTask {
        host: Rc::clone(host),
        timer: Cell::new(None),
        attempts: Cell::new(0),
        state: Cell::new(PollState::Running),
    });

    let probe = RefCell::new(probe);
    let on_ready = Cell::new(Some(on_ready));
    let on_exhausted = Cell::new(Some(on_exhausted));

    let tick = {
        let task = Rc::clone(&task);
        move || {
            if !task.is_running() {
                return;
            }

            let attempt = task.attempts.get() + 1;
            task.attempts.set(attempt);

            let outcome = {
                let mut probe = probe.borrow_mut();
                (*probe)(attempt)
            };
            match outcome {
                Probe::Ready(value) => {
                    task.finish(PollState::Ready);
                    if let Some(f) = on_ready.take() {
                        f(value);
                    }
                }
                Probe::Pending if attempt >= budget.max_attempts => {
                    task.finish(PollState::Exhausted);
                    if let Some(f) = on_exhausted.take() {
                        f(attempt);
                    }
                }
                Probe::Pending => {}
            }
        }
    };

    match host.set_interval(budget.interval_ms, Box::new(tick)) {
        Some(id) => task.timer.set(Some(id)),
        None => {
            log::warn!("Could not start poll timer");
            task.state.set(PollState::Exhausted);
        }
    }

    task
}
