//! Count-up animation for `.stat-number` elements.
//!
//! Each stat is observed once at 50% visibility. The first time it comes into
//! view its text counts from 0 to `data-target` on a fixed tick, ending on the
//! exact target. A stat never animates twice.

use tracing::debug;
use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::scheduler::TimerId;
use crate::visibility::{ObserveMode, ObserverId, ObserverOptions, VisibilityEntry};

const STAT_SELECTOR: &str = ".stat-number";

/// Integer prefix of a `data-target` value: `"150+"` is 150.
///
/// Missing, non-numeric and negative values count to 0. Digit runs too long
/// for a `u64` saturate.
pub fn parse_target(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFrame {
    Running(u64),
    Finished(u64),
}

impl CounterFrame {
    pub fn value(self) -> u64 {
        match self {
            Self::Running(value) | Self::Finished(value) => value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CounterAnimation {
    pub node: NodeId,
    pub target: u64,
    current: f64,
    step: f64,
    timer: Option<TimerId>,
}

impl CounterAnimation {
    pub fn new(node: NodeId, target: u64, duration_ms: u64, tick_ms: u64) -> Self {
        let ticks = duration_ms as f64 / tick_ms.max(1) as f64;
        Self {
            node,
            target,
            current: 0.0,
            step: target as f64 / ticks,
            timer: None,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn tick(&mut self) -> CounterFrame {
        self.current += self.step;
        if self.current >= self.target as f64 {
            CounterFrame::Finished(self.target)
        } else {
            CounterFrame::Running(self.current.floor() as u64)
        }
    }
}

#[derive(Debug, Default)]
pub struct StatsCounter {
    observer: Option<ObserverId>,
    started: Vec<NodeId>,
    running: Vec<CounterAnimation>,
}

impl StatsCounter {
    pub fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    /// Counters still ticking.
    pub fn running(&self) -> usize {
        self.running.len()
    }

    fn start(&mut self, cx: &mut PageContext<'_>, node: NodeId) {
        if self.started.contains(&node) {
            return;
        }
        self.started.push(node);
        let target = parse_target(cx.doc.attr(node, "data-target"));
        let config = cx.config;
        let counter = &config.counter;
        let mut animation =
            CounterAnimation::new(node, target, counter.duration_ms, counter.tick_ms);
        animation.timer = Some(cx.set_interval(counter.tick_ms));
        debug!(node = node.0, target, step = animation.step, "counter started");
        self.running.push(animation);
    }
}

impl Behavior for StatsCounter {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        let stats = cx.query_all(STAT_SELECTOR);
        if stats.is_empty() {
            return;
        }
        let observer = cx.create_observer(ObserverOptions {
            threshold: cx.config.counter.visibility_threshold,
            bottom_margin: 0.0,
            mode: ObserveMode::Once,
        });
        for stat in stats {
            cx.observe(observer, stat);
        }
        self.observer = Some(observer);
    }

    fn on_visibility(&mut self, cx: &mut PageContext<'_>, entries: &[VisibilityEntry]) {
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            self.start(cx, entry.node);
        }
    }

    fn on_timer(&mut self, cx: &mut PageContext<'_>, timer: TimerId) {
        let Some(index) = self
            .running
            .iter()
            .position(|animation| animation.timer == Some(timer))
        else {
            return;
        };
        let animation = &mut self.running[index];
        let frame = animation.tick();
        cx.doc.set_text(animation.node, &frame.value().to_string());
        if let CounterFrame::Finished(value) = frame {
            cx.clear_timer(timer);
            debug!(node = animation.node.0, value, "counter finished");
            self.running.remove(index);
        }
    }
}
