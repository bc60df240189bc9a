//! Category tabs that partition the accordion panels.

use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext, Signal};
use crate::events::{PageEvent, closest_listener};

pub const ALL: &str = "all";
const HIDDEN: &str = "hidden";
const ACTIVE: &str = "active";
const SHOW_ANIMATION: &str = "fadeInUp 0.5s ease forwards";

/// Whether an item tagged with `categories` is shown under `tag`.
///
/// `categories` is a list separated by whitespace or commas; an item without
/// one only shows under [`ALL`]. An empty tag matches nothing.
pub fn matches_category(categories: Option<&str>, tag: &str) -> bool {
    if tag == ALL {
        return true;
    }
    !tag.is_empty()
        && categories.is_some_and(|list| {
            list.split(|c: char| c.is_whitespace() || c == ',')
                .filter(|token| !token.is_empty())
                .any(|token| token == tag)
        })
}

/// The one active filter tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    active: String,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            active: ALL.to_string(),
        }
    }
}

impl FilterSelection {
    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn select(&mut self, tag: &str) {
        self.active = tag.to_string();
    }

    pub fn shows(&self, categories: Option<&str>) -> bool {
        matches_category(categories, &self.active)
    }
}

#[derive(Debug, Default)]
pub struct CategoryFilter {
    tabs: Vec<NodeId>,
    items: Vec<NodeId>,
    selection: FilterSelection,
}

impl CategoryFilter {
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Activate `tab`, show matching items, and collapse the accordion.
    fn select_category(&mut self, cx: &mut PageContext<'_>, tab: NodeId, tag: &str) {
        self.selection.select(tag);
        for other in &self.tabs {
            cx.doc.remove_class(*other, ACTIVE);
        }
        cx.doc.add_class(tab, ACTIVE);

        let mut shown = 0;
        for item in &self.items {
            if self.selection.shows(cx.doc.attr(*item, "data-category")) {
                cx.doc.remove_class(*item, HIDDEN);
                cx.doc.set_style(*item, "animation", SHOW_ANIMATION);
                shown += 1;
            } else {
                cx.doc.add_class(*item, HIDDEN);
            }
        }
        debug!(category = tag, shown, total = self.items.len(), "filter applied");
        cx.emit(Signal::CollapseAccordion);
    }
}

impl Behavior for CategoryFilter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.tabs = cx.query_all(".filter-tab");
        if self.tabs.is_empty() {
            return;
        }
        self.items = cx.query_all(".accordion-item");
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        let Some(target) = event.click_target() else {
            return;
        };
        let Some(tab) = closest_listener(cx.doc, &self.tabs, target) else {
            return;
        };
        let Some(tag) = cx
            .doc
            .attr(tab, "data-category")
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
        else {
            debug!(tab = tab.0, "filter tab without a category");
            return;
        };
        self.select_category(cx, tab, &tag);
    }
}
