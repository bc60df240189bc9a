//! Scroll-triggered reveal: elements settle into place the first time they
//! enter the viewport and are never hidden again.

use tracing::trace;
use vista_config::RevealConfig;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::visibility::{ObserveMode, ObserverId, ObserverOptions, VisibilityEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RevealKind {
    /// Feature cards and `.fade-in` blocks slide up.
    Cards,
    /// Timeline entries slide in sideways, with a deeper bottom margin.
    Timeline,
}

#[derive(Debug)]
pub struct RevealOnScroll {
    kind: RevealKind,
    observer: Option<ObserverId>,
    revealed: Vec<NodeId>,
}

impl RevealOnScroll {
    pub(crate) fn new(kind: RevealKind) -> Self {
        Self {
            kind,
            observer: None,
            revealed: Vec::new(),
        }
    }

    pub fn cards() -> Self {
        Self::new(RevealKind::Cards)
    }

    /// Whether init found anything to observe.
    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    /// Elements revealed so far, in reveal order.
    pub fn revealed(&self) -> &[NodeId] {
        &self.revealed
    }

    fn bottom_margin(&self, config: &RevealConfig) -> f64 {
        match self.kind {
            RevealKind::Cards => config.bottom_margin,
            RevealKind::Timeline => config.timeline_bottom_margin,
        }
    }

    fn revealed_transform(&self) -> &'static str {
        match self.kind {
            RevealKind::Cards => "translateY(0)",
            RevealKind::Timeline => "translateX(0)",
        }
    }
}

impl Behavior for RevealOnScroll {
    fn name(&self) -> &'static str {
        match self.kind {
            RevealKind::Cards => "reveal",
            RevealKind::Timeline => "timeline",
        }
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        let config = cx.config;
        let reveal = &config.reveal;
        let (staggered, plain) = match self.kind {
            RevealKind::Cards => (
                cx.query_all(".feature-card[data-aos]"),
                cx.query_all(".fade-in"),
            ),
            RevealKind::Timeline => (Vec::new(), cx.query_all(".timeline-item")),
        };
        if staggered.is_empty() && plain.is_empty() {
            return;
        }
        let observer = cx.create_observer(ObserverOptions {
            threshold: reveal.threshold,
            bottom_margin: self.bottom_margin(reveal),
            mode: ObserveMode::Persistent,
        });
        let stagger_s = reveal.stagger_s;
        for (index, card) in staggered.iter().enumerate() {
            let delay = format!("{}s", round_delay(index as f64 * stagger_s));
            cx.doc.set_style(*card, "animation-delay", &delay);
            cx.observe(observer, *card);
        }
        for node in plain {
            cx.observe(observer, node);
        }
        self.observer = Some(observer);
    }

    fn on_visibility(&mut self, cx: &mut PageContext<'_>, entries: &[VisibilityEntry]) {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            cx.doc.set_style(entry.node, "opacity", "1");
            cx.doc.set_style(entry.node, "transform", self.revealed_transform());
            if !self.revealed.contains(&entry.node) {
                trace!(node = entry.node.0, ratio = entry.ratio, "revealed");
                self.revealed.push(entry.node);
            }
        }
    }
}

/// Trim float noise so `3 * 0.1` prints as `0.3`.
fn round_delay(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_print_like_decimal_seconds() {
        assert_eq!(format!("{}s", round_delay(0.0)), "0s");
        assert_eq!(format!("{}s", round_delay(3.0 * 0.1)), "0.3s");
        assert_eq!(format!("{}s", round_delay(10.0 * 0.1)), "1s");
    }

    #[test]
    fn timeline_uses_the_deeper_margin() {
        let config = RevealConfig::default();
        assert_eq!(RevealOnScroll::cards().bottom_margin(&config), 50.0);
        let timeline = RevealOnScroll::new(RevealKind::Timeline);
        assert_eq!(timeline.bottom_margin(&config), 100.0);
        assert_eq!(timeline.revealed_transform(), "translateX(0)");
    }
}
