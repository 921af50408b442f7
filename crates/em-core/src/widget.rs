//! Widget loading
//!
//! The HubSpot embed script is an external collaborator: all the core knows
//! is that `load` eventually calls the ready callback, or never does. The
//! [`ReadySignal`] makes that a single-shot flag, and a watchdog timer warns
//! when it stays pending.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::host::Host;

/// Loads the external form widget and asks it to render the hidden form.
pub trait WidgetLoader {
    /// Inject the widget script (once per page) and create the form
    /// described by `config`. `on_ready` fires when the form has rendered;
    /// it may never fire if the script is blocked or fails to load.
    fn load(&self, config: &WidgetConfig, on_ready: Box<dyn FnOnce()>);
}

/// Single-shot readiness flag.
#[derive(Debug, Clone, Default)]
pub struct ReadySignal(Rc<Cell<bool>>);

impl ReadySignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark ready. Returns false if it was already ready.
    pub fn fire(&self) -> bool {
        !self.0.replace(true)
    }

    pub fn is_ready(&self) -> bool {
        self.0.get()
    }
}

/// Start loading the widget and arm a watchdog.
///
/// The watchdog only logs: a stalled script load cannot be cancelled, and the
/// locator's own budget decides when to give up.
pub fn start_widget<H: Host>(
    host: &Rc<H>,
    loader: &dyn WidgetLoader,
    config: &WidgetConfig,
    ready_timeout_ms: u32,
) -> ReadySignal {
    let signal = ReadySignal::new();

    let on_ready = {
        let signal = signal.clone();
        Box::new(move || {
            if signal.fire() {
                log::debug!("HubSpot form is ready");
            }
        })
    };
    loader.load(config, on_ready);

    if ready_timeout_ms > 0 && !signal.is_ready() {
        let watchdog = {
            let signal = signal.clone();
            let form_id = config.form_id.clone();
            Box::new(move || {
                if !signal.is_ready() {
                    log::warn!(
                        "HubSpot form {form_id} did not report ready within {ready_timeout_ms}ms; \
                         the embed script may be blocked"
                    );
                }
            })
        };
        if host.set_timeout(ready_timeout_ms, watchdog).is_none() {
            log::debug!("Could not arm widget watchdog");
        }
    }

    signal
}
