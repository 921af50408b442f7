//! Core type definitions for Email Mirror
//!
//! Small value types shared between the core logic and the host bindings.

// =============================================================================
// Page Decision
// =============================================================================

/// Outcome of gating the current page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDecision {
    /// At least one allow pattern matched and no block pattern did
    Allowed,
    /// A block pattern matched (takes precedence over the allow list)
    Blocked,
    /// Nothing matched
    NotListed,
}

impl PageDecision {
    pub fn is_allowed(self) -> bool {
        self == Self::Allowed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Blocked => "blocked",
            Self::NotListed => "not_listed",
        }
    }
}

// =============================================================================
// DOM Events
// =============================================================================

/// DOM events the mirror and forwarder listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Click,
    KeyPress,
    Submit,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Click => "click",
            Self::KeyPress => "keypress",
            Self::Submit => "submit",
        }
    }
}

/// A DOM event as seen by a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    /// `KeyboardEvent.key`, only set for key events
    pub key: Option<String>,
}

impl DomEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, key: None }
    }

    pub fn key_press(key: &str) -> Self {
        Self {
            kind: EventKind::KeyPress,
            key: Some(key.to_string()),
        }
    }

    pub fn is_enter(&self) -> bool {
        self.kind == EventKind::KeyPress && self.key.as_deref() == Some("Enter")
    }
}

// =============================================================================
// Submission Triggers
// =============================================================================

bitflags::bitflags! {
    /// Submission triggers bound by the forwarder.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Triggers: u8 {
        /// Click on the native submit control
        const CLICK = 1 << 0;
        /// Enter keypress inside the native form
        const ENTER = 1 << 1;
        /// Native form submit event
        const SUBMIT = 1 << 2;

        const ALL = Self::CLICK.bits() | Self::ENTER.bits() | Self::SUBMIT.bits();
    }
}
