//! Viewport-reactive page controller.
//!
//! Drives a parsed [`vista_dom::Document`] the way the site's page script
//! drives the browser DOM: scroll position, element visibility and clicks
//! toggle classes, inline styles and counters. Everything runs on one thread
//! against a virtual clock, so sessions are deterministic.

pub mod behavior;
pub mod behaviors;
pub mod easing;
pub mod events;
pub mod notify;
pub mod page;
pub mod scheduler;
pub mod script;
pub mod timing;
pub mod viewport;
pub mod visibility;

pub use behavior::{Behavior, PageContext, Signal};
pub use easing::{Easing, UnknownEasing};
pub use events::PageEvent;
pub use notify::Notifier;
pub use page::{DispatchOutcome, Page};
pub use scheduler::{Scheduler, TimerId, TimerOwner};
pub use script::{ScriptError, Session, SessionReport, SessionStep, run_session};
pub use timing::{Debounce, Throttle};
pub use viewport::Viewport;
pub use visibility::{ObserveMode, ObserverId, ObserverOptions, ObserverRegistry, VisibilityEntry};
