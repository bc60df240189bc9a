//! Single-open accordion over `.accordion-item` panels.

use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext, Signal};
use crate::events::{PageEvent, closest_listener};

const ACTIVE: &str = "active";

/// Which panel, if any, is open. At most one panel is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccordionState {
    len: usize,
    open: Option<usize>,
}

impl AccordionState {
    pub fn new(len: usize) -> Self {
        Self { len, open: None }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn open(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    /// Header click: closes the panel if it is open, otherwise opens it and
    /// closes every other panel.
    pub fn activate(&mut self, index: usize) {
        if index >= self.len {
            return;
        }
        self.open = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn close_all(&mut self) {
        self.open = None;
    }
}

#[derive(Debug, Clone)]
struct Panel {
    item: NodeId,
    header: Option<NodeId>,
    content: Option<NodeId>,
}

impl Panel {
    /// Element whose clicks toggle the panel.
    fn listener(&self) -> NodeId {
        self.header.unwrap_or(self.item)
    }
}

#[derive(Debug, Default)]
pub struct Accordion {
    panels: Vec<Panel>,
    state: AccordionState,
}

impl Accordion {
    pub fn state(&self) -> AccordionState {
        self.state
    }

    /// Make the DOM agree with `state`.
    fn render(&self, cx: &mut PageContext<'_>) {
        for (index, panel) in self.panels.iter().enumerate() {
            if self.state.is_open(index) {
                cx.doc.add_class(panel.item, ACTIVE);
                if let Some(content) = panel.content {
                    let height = cx.layout.scroll_height(content);
                    cx.doc.set_style(content, "max-height", &format!("{height}px"));
                }
            } else {
                cx.doc.remove_class(panel.item, ACTIVE);
                if let Some(content) = panel.content {
                    cx.doc.clear_style(content, "max-height");
                }
            }
        }
    }
}

impl Behavior for Accordion {
    fn name(&self) -> &'static str {
        "accordion"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.panels = cx
            .query_all(".accordion-item")
            .into_iter()
            .map(|item| Panel {
                item,
                header: cx.query_first_within(item, ".accordion-header"),
                content: cx.query_first_within(item, ".accordion-content"),
            })
            .collect();
        self.state = AccordionState::new(self.panels.len());
        if self.panels.is_empty() {
            return;
        }
        self.state.activate(0);
        self.render(cx);
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        let Some(target) = event.click_target() else {
            return;
        };
        let listeners: Vec<NodeId> = self.panels.iter().map(Panel::listener).collect();
        let Some(listener) = closest_listener(cx.doc, &listeners, target) else {
            return;
        };
        let Some(index) = listeners.iter().position(|node| *node == listener) else {
            return;
        };
        self.state.activate(index);
        debug!(panel = index, open = ?self.state.open(), "accordion toggled");
        self.render(cx);
    }

    fn on_signal(&mut self, cx: &mut PageContext<'_>, signal: &Signal) {
        match signal {
            Signal::CollapseAccordion => {
                self.state.close_all();
                self.render(cx);
            }
        }
    }
}
