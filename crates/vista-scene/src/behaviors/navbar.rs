//! Sticky navigation bar and the mobile hamburger menu.

use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::events::{PageEvent, closest_listener, reaches};

const SCROLLED: &str = "scrolled";
const ACTIVE: &str = "active";

/// Bar styles for the open (cross) and closed (three bars) hamburger.
const OPEN_BARS: [(&str, &str); 3] = [
    ("transform", "rotate(45deg) translate(5px, 5px)"),
    ("opacity", "0"),
    ("transform", "rotate(-45deg) translate(7px, -6px)"),
];
const CLOSED_BARS: [(&str, &str); 3] = [("transform", "none"), ("opacity", "1"), ("transform", "none")];

#[derive(Debug, Default)]
pub struct Navbar {
    navbar: Option<NodeId>,
    hamburger: Option<NodeId>,
    menu: Option<NodeId>,
    bars: Vec<NodeId>,
    links: Vec<NodeId>,
}

impl Navbar {
    fn sync_scrolled(&self, cx: &mut PageContext<'_>) {
        let Some(navbar) = self.navbar else {
            return;
        };
        if cx.viewport.scroll_y() > cx.config.navigation.scroll_threshold {
            cx.doc.add_class(navbar, SCROLLED);
        } else {
            cx.doc.remove_class(navbar, SCROLLED);
        }
    }

    fn toggle_menu(&self, cx: &mut PageContext<'_>) {
        let Some(menu) = self.menu else {
            return;
        };
        let open = cx.doc.toggle_class(menu, ACTIVE);
        let styles = if open { OPEN_BARS } else { CLOSED_BARS };
        for (bar, (property, value)) in self.bars.iter().zip(styles) {
            cx.doc.set_style(*bar, property, value);
        }
        debug!(open, "mobile menu toggled");
    }

    /// Close the menu and reset every bar.
    fn close_menu(&self, cx: &mut PageContext<'_>) {
        if let Some(menu) = self.menu {
            cx.doc.remove_class(menu, ACTIVE);
        }
        for bar in &self.bars {
            cx.doc.set_style(*bar, "transform", "none");
            cx.doc.set_style(*bar, "opacity", "1");
        }
    }
}

impl Behavior for Navbar {
    fn name(&self) -> &'static str {
        "navbar"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.navbar = cx.query(".navbar");
        self.hamburger = cx.query(".hamburger");
        self.menu = cx.query(".nav-menu");
        self.bars = self
            .hamburger
            .map(|hamburger| cx.query_within(hamburger, "span"))
            .unwrap_or_default();
        self.links = cx.query_all(".nav-link");
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        match event {
            PageEvent::Scroll { .. } => self.sync_scrolled(cx),
            PageEvent::Click { target } => {
                if self
                    .hamburger
                    .is_some_and(|hamburger| reaches(cx.doc, hamburger, *target))
                {
                    self.toggle_menu(cx);
                }
                if closest_listener(cx.doc, &self.links, *target).is_some()
                    && cx.viewport.width <= cx.config.navigation.mobile_breakpoint
                {
                    self.close_menu(cx);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_and_closed_bar_styles_cover_three_bars() {
        assert_eq!(OPEN_BARS[1], ("opacity", "0"));
        assert!(CLOSED_BARS.iter().all(|(_, value)| *value == "none" || *value == "1"));
    }
}
