//! Reading-progress bar pinned to the top of the viewport (off by default).

use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::events::PageEvent;
use crate::scheduler::TimerId;
use crate::timing::{Debounce, Throttle};

const BAR_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("height", "3px"),
    (
        "background",
        "linear-gradient(90deg, var(--primary-color), var(--secondary-color))",
    ),
    ("z-index", "9999"),
    ("transition", "width 0.1s ease"),
];

const RESIZE_SETTLE_MS: u64 = 150;

/// Share of the scrollable range already scrolled, in percent.
pub fn scroll_percentage(scroll_y: f64, document_height: f64, viewport_height: f64) -> f64 {
    let range = document_height - viewport_height;
    if range <= 0.0 {
        return 0.0;
    }
    (scroll_y / range * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug)]
pub struct ScrollProgress {
    bar: Option<NodeId>,
    throttle: Throttle,
    resize: Debounce,
}

impl Default for ScrollProgress {
    fn default() -> Self {
        Self {
            bar: None,
            throttle: Throttle::new(0),
            resize: Debounce::new(RESIZE_SETTLE_MS),
        }
    }
}

impl ScrollProgress {
    pub fn bar(&self) -> Option<NodeId> {
        self.bar
    }

    fn update(&self, cx: &mut PageContext<'_>) {
        let Some(bar) = self.bar else {
            return;
        };
        let percent = scroll_percentage(
            cx.viewport.scroll_y(),
            cx.layout.document_height(),
            cx.viewport.height,
        );
        cx.doc.set_style(bar, "width", &format!("{percent}%"));
    }
}

impl Behavior for ScrollProgress {
    fn name(&self) -> &'static str {
        "progress"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        if !cx.config.progress.enabled {
            return;
        }
        let Some(body) = cx.doc.body() else {
            return;
        };
        let Some(bar) = cx.doc.append_element(body, "div") else {
            return;
        };
        for (property, value) in BAR_STYLE {
            cx.doc.set_style(bar, property, value);
        }
        self.throttle = Throttle::new(cx.config.progress.throttle_ms);
        self.bar = Some(bar);
        debug!(bar = bar.0, "scroll progress bar attached");
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        if self.bar.is_none() {
            return;
        }
        match event {
            PageEvent::Scroll { .. } if self.throttle.try_acquire(cx.now()) => self.update(cx),
            PageEvent::Resize { .. } => {
                let owner = cx.timer_owner();
                self.resize.call(cx.scheduler(), owner);
            }
            _ => {}
        }
    }

    fn on_timer(&mut self, cx: &mut PageContext<'_>, timer: TimerId) {
        if self.resize.take_fired(timer) {
            self.update(cx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_of_scrollable_range() {
        assert_eq!(scroll_percentage(0.0, 2800.0, 800.0), 0.0);
        assert_eq!(scroll_percentage(1000.0, 2800.0, 800.0), 50.0);
        assert_eq!(scroll_percentage(2000.0, 2800.0, 800.0), 100.0);
    }

    #[test]
    fn short_pages_report_zero() {
        assert_eq!(scroll_percentage(0.0, 500.0, 800.0), 0.0);
    }
}
