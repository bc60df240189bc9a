//! The `Behavior` trait and the context handed to its hooks.
//!
//! Each page feature is a `Behavior` registered on the [`Page`](crate::Page).
//! Behaviors own their element handles and state; they reach the document,
//! timers, visibility observers and the notification surface only through
//! [`PageContext`], which is rebuilt for every hook call.

use tracing::{info, warn};
use vista_config::VistaConfig;
use vista_dom::{Document, Layout, Mutation, NodeId, Selector};

use crate::events::PageEvent;
use crate::notify::Notifier;
use crate::scheduler::{Scheduler, TimerId, TimerOwner};
use crate::viewport::Viewport;
use crate::visibility::{ObserverId, ObserverOptions, ObserverRegistry, VisibilityEntry};

/// Cross-behavior messages, delivered synchronously to every other behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Close every accordion panel.
    CollapseAccordion,
}

/// Page-level work a behavior asks for; the page applies it after the hook.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Request {
    ScrollTo { y: f64, smooth: bool },
    Navigate { href: String },
}

#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub requests: Vec<Request>,
    pub signals: Vec<(usize, Signal)>,
    pub default_prevented: bool,
}

pub trait Behavior {
    fn name(&self) -> &'static str;

    /// Locate elements and register observers (`DOMContentLoaded`).
    fn init(&mut self, cx: &mut PageContext<'_>);

    fn on_event(&mut self, _cx: &mut PageContext<'_>, _event: &PageEvent) {}

    fn on_timer(&mut self, _cx: &mut PageContext<'_>, _timer: TimerId) {}

    fn on_visibility(&mut self, _cx: &mut PageContext<'_>, _entries: &[VisibilityEntry]) {}

    fn on_signal(&mut self, _cx: &mut PageContext<'_>, _signal: &Signal) {}
}

pub struct PageContext<'a> {
    pub doc: &'a mut Document,
    pub layout: &'a Layout,
    pub viewport: &'a Viewport,
    pub config: &'a VistaConfig,
    pub(crate) scheduler: &'a mut Scheduler,
    pub(crate) observers: &'a mut ObserverRegistry,
    pub(crate) notifier: &'a mut Notifier,
    pub(crate) effects: &'a mut Effects,
    pub(crate) owner: usize,
}

impl PageContext<'_> {
    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// `document.querySelectorAll`; an invalid selector matches nothing.
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(selector) => self.doc.query_all(&selector),
            Err(err) => {
                warn!(%err, "ignoring invalid selector");
                Vec::new()
            }
        }
    }

    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// `scope.querySelectorAll`.
    pub fn query_within(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(selector) => self.doc.query_within(scope, &selector),
            Err(err) => {
                warn!(%err, "ignoring invalid selector");
                Vec::new()
            }
        }
    }

    pub fn query_first_within(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        self.query_within(scope, selector).into_iter().next()
    }

    pub fn set_timeout(&mut self, delay_ms: u64) -> TimerId {
        self.scheduler
            .set_timeout(TimerOwner::Behavior(self.owner), delay_ms)
    }

    pub fn set_interval(&mut self, period_ms: u64) -> TimerId {
        self.scheduler
            .set_interval(TimerOwner::Behavior(self.owner), period_ms)
    }

    pub fn clear_timer(&mut self, timer: TimerId) {
        self.scheduler.cancel(timer);
    }

    /// The scheduler, for timing utilities that arm their own timers.
    pub fn scheduler(&mut self) -> &mut Scheduler {
        &mut *self.scheduler
    }

    pub fn timer_owner(&self) -> TimerOwner {
        TimerOwner::Behavior(self.owner)
    }

    pub fn create_observer(&mut self, options: ObserverOptions) -> ObserverId {
        self.observers.create(self.owner, options)
    }

    pub fn observe(&mut self, observer: ObserverId, node: NodeId) {
        self.observers.observe(observer, node);
    }

    pub fn unobserve(&mut self, observer: ObserverId, node: NodeId) {
        self.observers.unobserve(observer, node);
    }

    pub fn emit(&mut self, signal: Signal) {
        self.effects.signals.push((self.owner, signal));
    }

    /// `event.preventDefault()`.
    pub fn prevent_default(&mut self) {
        self.effects.default_prevented = true;
    }

    /// `window.scrollTo`; smooth requests animate over the configured duration.
    pub fn scroll_to(&mut self, y: f64, smooth: bool) {
        self.effects.requests.push(Request::ScrollTo { y, smooth });
    }

    /// `window.location.href = href`.
    pub fn navigate(&mut self, href: impl Into<String>) {
        self.effects.requests.push(Request::Navigate { href: href.into() });
    }

    pub fn notify(&mut self, message: &str) -> bool {
        self.notifier.show(self.doc, self.scheduler, message)
    }

    /// `console.log`: an info record plus a journal entry.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(target: "vista::console", "{message}");
        self.doc.record(Mutation::Log { message });
    }
}
