//! Element visibility observers (`IntersectionObserver`).
//!
//! Behaviors register observers with a threshold and a bottom root margin,
//! then observe elements. The page evaluates the registry at frame
//! boundaries; each evaluation yields at most one entry per observed
//! element, and only when its intersecting state changed or it was just
//! observed. Many scroll events between two evaluations therefore coalesce
//! into a single notification.

use tracing::debug;
use vista_dom::{Layout, NodeId};

use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub usize);

/// Whether an observation survives its first intersecting notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveMode {
    /// Unobserve the element right after it is first reported intersecting.
    Once,
    /// Keep reporting crossings for the lifetime of the page.
    Persistent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the element's height that must lie inside the root.
    pub threshold: f64,
    /// Pixels trimmed off the bottom of the viewport (`rootMargin: 0 0 -Npx 0`).
    pub bottom_margin: f64,
    pub mode: ObserveMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry {
    pub observer: ObserverId,
    pub node: NodeId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

#[derive(Debug)]
struct Observation {
    node: NodeId,
    /// Last reported state; `None` until the initial notification.
    reported: Option<bool>,
}

#[derive(Debug)]
struct Observer {
    owner: usize,
    options: ObserverOptions,
    targets: Vec<Observation>,
    connected: bool,
}

#[derive(Debug, Default)]
pub struct ObserverRegistry {
    observers: Vec<Observer>,
    dirty: bool,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, owner: usize, options: ObserverOptions) -> ObserverId {
        let id = ObserverId(self.observers.len());
        self.observers.push(Observer {
            owner,
            options,
            targets: Vec::new(),
            connected: true,
        });
        id
    }

    pub fn observe(&mut self, observer: ObserverId, node: NodeId) {
        let Some(entry) = self.observers.get_mut(observer.0) else {
            return;
        };
        if !entry.connected || entry.targets.iter().any(|t| t.node == node) {
            return;
        }
        entry.targets.push(Observation {
            node,
            reported: None,
        });
        self.dirty = true;
    }

    pub fn unobserve(&mut self, observer: ObserverId, node: NodeId) {
        if let Some(entry) = self.observers.get_mut(observer.0) {
            entry.targets.retain(|t| t.node != node);
        }
    }

    pub fn disconnect(&mut self, observer: ObserverId) {
        if let Some(entry) = self.observers.get_mut(observer.0) {
            entry.targets.clear();
            entry.connected = false;
        }
    }

    pub fn is_observing(&self, observer: ObserverId, node: NodeId) -> bool {
        self.observers
            .get(observer.0)
            .is_some_and(|entry| entry.targets.iter().any(|t| t.node == node))
    }

    pub fn observed_count(&self) -> usize {
        self.observers.iter().map(|o| o.targets.len()).sum()
    }

    /// Geometry may have moved relative to the viewport.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Evaluate every observation and return changed entries grouped by owner,
    /// in observer creation order.
    pub fn evaluate(&mut self, layout: &Layout, viewport: &Viewport) -> Vec<(usize, Vec<VisibilityEntry>)> {
        self.dirty = false;
        let mut batches = Vec::new();
        for (index, observer) in self.observers.iter_mut().enumerate() {
            let mut entries = Vec::new();
            for target in observer.targets.iter_mut() {
                let (is_intersecting, ratio) =
                    intersection(layout, viewport, target.node, &observer.options);
                if target.reported == Some(is_intersecting) {
                    continue;
                }
                target.reported = Some(is_intersecting);
                entries.push(VisibilityEntry {
                    observer: ObserverId(index),
                    node: target.node,
                    is_intersecting,
                    ratio,
                });
            }
            if entries.is_empty() {
                continue;
            }
            if observer.options.mode == ObserveMode::Once {
                observer.targets.retain(|t| {
                    !entries
                        .iter()
                        .any(|e| e.is_intersecting && e.node == t.node)
                });
            }
            debug!(
                observer = index,
                entries = entries.len(),
                "visibility notifications"
            );
            batches.push((observer.owner, entries));
        }
        batches
    }
}

/// Intersection of an element with the viewport trimmed by the bottom margin.
pub fn intersection(
    layout: &Layout,
    viewport: &Viewport,
    node: NodeId,
    options: &ObserverOptions,
) -> (bool, f64) {
    let Some(geometry) = layout.geometry(node) else {
        return (false, 0.0);
    };
    let root_top = viewport.scroll_y();
    let root_bottom = root_top + (viewport.height - options.bottom_margin).max(0.0);

    if geometry.height <= 0.0 {
        let inside = geometry.top >= root_top && geometry.top <= root_bottom;
        return (inside, if inside { 1.0 } else { 0.0 });
    }
    let overlap = (root_bottom.min(geometry.bottom()) - root_top.max(geometry.top)).max(0.0);
    let ratio = (overlap / geometry.height).min(1.0);
    (overlap > 0.0 && ratio >= options.threshold, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_dom::{BlockLayout, Document};

    fn fixture() -> (Document, Layout) {
        let doc = Document::parse(
            r#"<body>
                <div id="hero" data-height="1000"></div>
                <div id="card" data-height="200"></div>
                <div id="tail" data-height="2000"></div>
            </body>"#,
        );
        let layout = BlockLayout::default().compute(&doc);
        (doc, layout)
    }

    fn options(threshold: f64, bottom_margin: f64, mode: ObserveMode) -> ObserverOptions {
        ObserverOptions {
            threshold,
            bottom_margin,
            mode,
        }
    }

    #[test]
    fn ratio_accounts_for_bottom_margin() {
        let (doc, layout) = fixture();
        let card = doc.by_id("card").unwrap();
        let mut viewport = Viewport::new(1280.0, 800.0);

        let opts = options(0.2, 50.0, ObserveMode::Persistent);

        // Root spans 210..960 with a 50px margin; card spans 1000..1200.
        viewport.set_scroll_y(210.0, &layout);
        assert_eq!(intersection(&layout, &viewport, card, &opts), (false, 0.0));

        // Root 280..1030: 30px of the card inside.
        viewport.set_scroll_y(280.0, &layout);
        let (hit, ratio) = intersection(&layout, &viewport, card, &opts);
        assert!(!hit);
        assert!((ratio - 0.15).abs() < 1e-9);

        // Root 300..1050: 50px inside.
        viewport.set_scroll_y(300.0, &layout);
        let (hit, ratio) = intersection(&layout, &viewport, card, &opts);
        assert!(hit);
        assert!((ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn reports_initial_state_then_only_changes() {
        let (doc, layout) = fixture();
        let hero = doc.by_id("hero").unwrap();
        let card = doc.by_id("card").unwrap();
        let mut viewport = Viewport::new(1280.0, 800.0);
        let mut registry = ObserverRegistry::new();
        let observer = registry.create(7, options(0.1, 0.0, ObserveMode::Persistent));
        registry.observe(observer, hero);
        registry.observe(observer, card);

        let batches = registry.evaluate(&layout, &viewport);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].0, 7);
        let states: Vec<_> = batches[0].1.iter().map(|e| (e.node, e.is_intersecting)).collect();
        assert_eq!(states, vec![(hero, true), (card, false)]);

        assert!(registry.evaluate(&layout, &viewport).is_empty());

        viewport.set_scroll_y(600.0, &layout);
        let batches = registry.evaluate(&layout, &viewport);
        let states: Vec<_> = batches[0].1.iter().map(|e| (e.node, e.is_intersecting)).collect();
        assert_eq!(states, vec![(card, true)]);
    }

    #[test]
    fn once_mode_unobserves_after_first_intersection() {
        let (doc, layout) = fixture();
        let card = doc.by_id("card").unwrap();
        let mut viewport = Viewport::new(1280.0, 800.0);
        let mut registry = ObserverRegistry::new();
        let observer = registry.create(0, options(0.5, 0.0, ObserveMode::Once));
        registry.observe(observer, card);

        // Initial, not intersecting: reported but still observed.
        assert_eq!(registry.evaluate(&layout, &viewport).len(), 1);
        assert!(registry.is_observing(observer, card));

        viewport.set_scroll_y(700.0, &layout);
        let batches = registry.evaluate(&layout, &viewport);
        assert!(batches[0].1[0].is_intersecting);
        assert!(!registry.is_observing(observer, card));

        viewport.set_scroll_y(0.0, &layout);
        assert!(registry.evaluate(&layout, &viewport).is_empty());
        viewport.set_scroll_y(700.0, &layout);
        assert!(registry.evaluate(&layout, &viewport).is_empty());
    }

    #[test]
    fn disconnected_observers_ignore_new_targets() {
        let (doc, layout) = fixture();
        let hero = doc.by_id("hero").unwrap();
        let viewport = Viewport::new(1280.0, 800.0);
        let mut registry = ObserverRegistry::new();
        let observer = registry.create(0, options(0.0, 0.0, ObserveMode::Persistent));
        registry.disconnect(observer);
        registry.observe(observer, hero);
        assert_eq!(registry.observed_count(), 0);
        assert!(registry.evaluate(&layout, &viewport).is_empty());
    }
}
