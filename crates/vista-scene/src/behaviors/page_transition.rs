//! Fade the page out before following an internal link, and in on load.

use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::events::{PageEvent, closest_listener};
use crate::scheduler::TimerId;

/// Whether clicking a link to `href` should fade the page out and navigate.
///
/// External (`http…`, `mailto:`) links and links to the page itself keep
/// their default behavior.
pub fn is_internal_navigation(href: &str, current_page: &str) -> bool {
    !(href.starts_with("http") || href.starts_with("mailto") || href == current_page)
}

#[derive(Debug, Default)]
pub struct PageTransition {
    links: Vec<NodeId>,
    body: Option<NodeId>,
    fade_in: Option<TimerId>,
    pending: Vec<(TimerId, String)>,
}

impl Behavior for PageTransition {
    fn name(&self) -> &'static str {
        "page-transition"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.body = cx.doc.body();
        self.links = cx.query_all(r##"a:not([href^="#"])"##);
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        match event {
            PageEvent::Loaded => {
                let Some(body) = self.body else {
                    return;
                };
                cx.doc.set_style(body, "opacity", "0");
                self.fade_in = Some(cx.set_timeout(cx.config.transition.fade_in_delay_ms));
            }
            PageEvent::Click { target } => {
                let Some(link) = closest_listener(cx.doc, &self.links, *target) else {
                    return;
                };
                let Some(href) = cx.doc.attr(link, "href").map(str::to_string) else {
                    return;
                };
                if !is_internal_navigation(&href, cx.doc.current_page()) {
                    return;
                }
                cx.prevent_default();
                if let Some(body) = self.body {
                    cx.doc.set_style(body, "opacity", "0");
                    cx.doc.set_style(body, "transition", "opacity 0.3s ease");
                }
                let timer = cx.set_timeout(cx.config.transition.fade_out_ms);
                debug!(%href, "fading out before navigation");
                self.pending.push((timer, href));
            }
            _ => {}
        }
    }

    fn on_timer(&mut self, cx: &mut PageContext<'_>, timer: TimerId) {
        if self.fade_in == Some(timer) {
            self.fade_in = None;
            if let Some(body) = self.body {
                cx.doc.set_style(body, "opacity", "1");
                cx.doc.set_style(body, "transition", "opacity 0.5s ease");
            }
        } else if let Some(index) = self.pending.iter().position(|(id, _)| *id == timer) {
            let (_, href) = self.pending.remove(index);
            cx.navigate(href);
        }
    }
}
