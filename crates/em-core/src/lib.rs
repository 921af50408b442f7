//! Email Mirror Core Library
//!
//! This crate links a page's native email field to a hidden HubSpot form so
//! that submitting the native form also submits the marketing form with the
//! same email. It carries no browser dependency: every DOM and timer access
//! goes through the [`Host`] and [`Element`] traits, which the wasm bindings
//! implement over `web-sys`.
//!
//! # Architecture
//!
//! A [`Session`] gates on the page URL, starts the widget loader, then polls
//! for the two email inputs. Once both exist, a retry loop attaches the
//! mirror and the submission forwarder until both are bound or the attempt
//! budget runs out. Every failure degrades to a log line.
//!
//! # Modules
//!
//! - `config`: JSON configuration and validation
//! - `url_filter`: wildcard allow/block URL gating
//! - `host`: DOM and timer abstraction
//! - `poll`: generic poll-until-ready utility
//! - `widget`: widget loader trait and readiness signal
//! - `locator`: native and widget email input discovery
//! - `mirror`: native → widget value mirroring
//! - `forwarder`: native → hidden form submission forwarding
//! - `session`: orchestration and retry driver
//! - `types`: Shared type definitions

pub mod config;
pub mod forwarder;
pub mod host;
pub mod locator;
pub mod mirror;
pub mod poll;
pub mod session;
pub mod types;
pub mod url_filter;
pub mod widget;

#[cfg(test)]
pub(crate) mod fake;

// Re-export commonly used types
pub use config::{ConfigError, MirrorConfig, Selectors, Timing, WidgetConfig};
pub use host::{Element, Host, TimerId};
pub use session::{Session, SessionStatus};
pub use types::{DomEvent, EventKind, PageDecision, Triggers};
pub use url_filter::{is_allowed, UrlFilter, UrlPattern};
pub use widget::{ReadySignal, WidgetLoader};
