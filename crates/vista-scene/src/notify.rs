//! The shared toast notification (`#notification`).

use tracing::debug;
use vista_config::NotificationConfig;
use vista_dom::{Document, NodeId, Selector};

use crate::scheduler::{Scheduler, TimerId, TimerOwner};

const CONTAINER_ID: &str = "notification";
const MESSAGE_SELECTOR: &str = ".notification-message";
const SHOW_CLASS: &str = "show";

/// Shows a message and hides it again after a fixed delay.
///
/// Requests never queue: a second message overwrites the first, and each
/// request keeps its own hide timer, so the earliest timer hides whatever
/// is on screen when it fires.
#[derive(Debug, Default)]
pub struct Notifier {
    container: Option<NodeId>,
    message: Option<NodeId>,
    display_ms: u64,
    hide_timers: Vec<TimerId>,
}

impl Notifier {
    pub fn attach(doc: &Document, config: &NotificationConfig) -> Self {
        let container = doc.by_id(CONTAINER_ID);
        let message = match (container, Selector::parse(MESSAGE_SELECTOR)) {
            (Some(container), Ok(selector)) => doc.query_first_within(container, &selector),
            _ => None,
        };
        Self {
            container,
            message,
            display_ms: config.display_ms,
            hide_timers: Vec::new(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.container.is_some()
    }

    /// Show `message`. Returns false when the page has no notification element.
    pub fn show(&mut self, doc: &mut Document, scheduler: &mut Scheduler, message: &str) -> bool {
        let Some(container) = self.container else {
            debug!(message, "no notification element; dropping message");
            return false;
        };
        if let Some(text) = self.message {
            doc.set_text(text, message);
        }
        doc.add_class(container, SHOW_CLASS);
        let timer = scheduler.set_timeout(TimerOwner::Notifier, self.display_ms);
        self.hide_timers.push(timer);
        true
    }

    pub fn on_timer(&mut self, doc: &mut Document, timer: TimerId) {
        let before = self.hide_timers.len();
        self.hide_timers.retain(|pending| *pending != timer);
        if self.hide_timers.len() == before {
            return;
        }
        if let Some(container) = self.container {
            doc.remove_class(container, SHOW_CLASS);
        }
    }

    pub fn is_visible(&self, doc: &Document) -> bool {
        self.container
            .is_some_and(|container| doc.has_class(container, SHOW_CLASS))
    }
}
