//! In-page anchor links scroll smoothly below the fixed navigation bar.

use tracing::debug;
use vista_dom::{NodeId, Selector};

use crate::behavior::{Behavior, PageContext};
use crate::events::{PageEvent, closest_listener};

#[derive(Debug, Default)]
pub struct SmoothScroll {
    links: Vec<NodeId>,
}

/// Scroll offset for an anchor target at `offset_top`.
pub fn anchor_offset(offset_top: f64, nav_height: f64) -> f64 {
    offset_top - nav_height
}

impl Behavior for SmoothScroll {
    fn name(&self) -> &'static str {
        "smooth-scroll"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.links = cx.query_all(r##"a[href^="#"]"##);
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        let Some(target) = event.click_target() else {
            return;
        };
        let Some(link) = closest_listener(cx.doc, &self.links, target) else {
            return;
        };
        let href = cx.doc.attr(link, "href").unwrap_or("").to_string();
        if href == "#" || href.is_empty() {
            return;
        }
        cx.prevent_default();

        let Some(section) = Selector::parse(&href)
            .ok()
            .and_then(|selector| cx.doc.query(&selector))
        else {
            debug!(%href, "anchor target not found");
            return;
        };
        let y = anchor_offset(cx.layout.offset_top(section), cx.config.navigation.anchor_offset);
        debug!(%href, y, "scrolling to anchor");
        cx.scroll_to(y, true);
    }
}
