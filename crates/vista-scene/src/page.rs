//! The page runtime: document, viewport, timers and behaviors.
//!
//! A [`Page`] owns everything a running page script would touch. Events are
//! dispatched synchronously to every behavior in registration order; timers
//! and visibility notifications are delivered as the virtual clock is moved
//! with [`Page::advance`].

use std::mem;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, warn};
use vista_config::VistaConfig;
use vista_dom::{BlockLayout, Document, Layout, Mutation, NodeId, Selector};

use crate::behavior::{Behavior, Effects, PageContext, Request, Signal};
use crate::behaviors;
use crate::easing::Easing;
use crate::events::PageEvent;
use crate::notify::Notifier;
use crate::scheduler::{FiredTimer, Scheduler, TimerId, TimerOwner};
use crate::viewport::Viewport;
use crate::visibility::{ObserverRegistry, VisibilityEntry};

/// What happened to the browser's default action for a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    pub default_prevented: bool,
}

enum Hook<'e> {
    Init,
    Event(&'e PageEvent),
    Timer(TimerId),
    Visibility(&'e [VisibilityEntry]),
    Signal(&'e Signal),
}

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    timer: TimerId,
    from: f64,
    to: f64,
    started_ms: u64,
    duration_ms: u64,
    easing: Easing,
}

pub struct Page {
    document: Document,
    layout: Layout,
    layout_revision: Option<u64>,
    viewport: Viewport,
    scheduler: Scheduler,
    observers: ObserverRegistry,
    notifier: Notifier,
    config: VistaConfig,
    behaviors: Vec<Box<dyn Behavior>>,
    effects: Effects,
    scroll_animation: Option<ScrollAnimation>,
    scroll_easing: Easing,
    navigations: Vec<String>,
}

impl Page {
    /// Build a page with the standard site behaviors and run their `init`.
    pub fn new(document: Document, config: VistaConfig) -> Self {
        Self::with_behaviors(document, config, behaviors::default_behaviors())
    }

    pub fn with_behaviors(
        document: Document,
        config: VistaConfig,
        behaviors: Vec<Box<dyn Behavior>>,
    ) -> Self {
        let notifier = Notifier::attach(&document, &config.notification);
        let scroll_easing = config
            .navigation
            .scroll_easing
            .parse()
            .unwrap_or_else(|err| {
                warn!(%err, "falling back to ease-in-out for smooth scrolling");
                Easing::default()
            });
        let mut page = Self {
            document,
            layout: Layout::default(),
            layout_revision: None,
            viewport: Viewport::from_config(&config.viewport),
            scheduler: Scheduler::new(),
            observers: ObserverRegistry::new(),
            notifier,
            config,
            behaviors: Vec::new(),
            effects: Effects::default(),
            scroll_animation: None,
            scroll_easing,
            navigations: Vec::new(),
        };

        let mut behaviors = behaviors;
        for index in 0..behaviors.len() {
            page.invoke(&mut behaviors, index, Hook::Init);
        }
        debug!(
            behaviors = behaviors.len(),
            elements = page.document.len(),
            "page initialized"
        );
        page.behaviors = behaviors;
        page.apply_requests();
        page
    }

    /// Parse `path` and build a page around it.
    pub fn open(path: &Path, config: VistaConfig) -> anyhow::Result<Self> {
        let document = Document::from_file(path)
            .with_context(|| format!("Failed to load page {}", path.display()))?;
        Ok(Self::new(document, config))
    }

    /// Fire `load` and deliver the initial visibility notifications.
    pub fn load(&mut self) {
        self.dispatch(PageEvent::Loaded);
        self.flush_visibility();
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Up-to-date layout of the current document.
    pub fn layout(&mut self) -> &Layout {
        self.refresh_layout();
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &VistaConfig {
        &self.config
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// Navigations requested so far, oldest first.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn is_notification_visible(&self) -> bool {
        self.notifier.is_visible(&self.document)
    }

    // ---- input -----------------------------------------------------------

    /// User scroll. Cancels any smooth scroll in flight.
    pub fn scroll(&mut self, y: f64) -> DispatchOutcome {
        self.cancel_scroll_animation();
        self.dispatch(PageEvent::Scroll { y })
    }

    pub fn resize(&mut self, width: f64, height: f64) -> DispatchOutcome {
        self.dispatch(PageEvent::Resize { width, height })
    }

    pub fn click(&mut self, target: NodeId) -> DispatchOutcome {
        self.dispatch(PageEvent::Click { target })
    }

    pub fn submit(&mut self, form: NodeId) -> DispatchOutcome {
        self.dispatch(PageEvent::Submit { form })
    }

    /// Type into a form field: set its value, then fire `input`.
    pub fn input(&mut self, target: NodeId, value: &str) -> DispatchOutcome {
        self.sync_clock();
        self.document.set_value(target, value);
        self.dispatch(PageEvent::Input {
            target,
            value: value.to_string(),
        })
    }

    /// Set a checkbox or radio. Checking a radio unchecks the rest of its group.
    pub fn set_checked(&mut self, target: NodeId, checked: bool) {
        self.sync_clock();
        let is_radio = self.document.attr(target, "type") == Some("radio");
        if is_radio && checked {
            let name = self.document.attr(target, "name").map(str::to_string);
            let group: Vec<NodeId> = self
                .document
                .node_ids()
                .filter(|node| {
                    *node != target
                        && self.document.attr(*node, "type") == Some("radio")
                        && self.document.attr(*node, "name").map(str::to_string) == name
                })
                .collect();
            for node in group {
                self.document.set_checked(node, false);
            }
        }
        self.document.set_checked(target, checked);
    }

    pub fn hover(&mut self, target: NodeId, client_x: f64, client_y: f64) -> DispatchOutcome {
        self.dispatch(PageEvent::MouseMove {
            target,
            client_x,
            client_y,
        })
    }

    pub fn leave(&mut self, target: NodeId) -> DispatchOutcome {
        self.dispatch(PageEvent::MouseLeave { target })
    }

    pub fn focus(&mut self, target: NodeId) -> DispatchOutcome {
        self.dispatch(PageEvent::Focus { target })
    }

    pub fn blur(&mut self, target: NodeId) -> DispatchOutcome {
        self.dispatch(PageEvent::Blur { target })
    }

    /// Deliver `event` to every behavior, then run the default action unless a
    /// handler prevented it.
    pub fn dispatch(&mut self, event: PageEvent) -> DispatchOutcome {
        self.sync_clock();
        debug!(event = event.name(), at_ms = self.scheduler.now(), "dispatch");
        match &event {
            PageEvent::Scroll { y } => self.apply_scroll(*y),
            PageEvent::Resize { width, height } => {
                self.viewport.resize(*width, *height);
                self.layout_revision = None;
                self.refresh_layout();
                let y = self.viewport.scroll_y();
                self.apply_scroll(y);
                self.observers.mark_dirty();
            }
            _ => {}
        }

        let mut behaviors = mem::take(&mut self.behaviors);
        for index in 0..behaviors.len() {
            self.invoke(&mut behaviors, index, Hook::Event(&event));
        }
        self.behaviors = behaviors;

        let default_prevented = mem::take(&mut self.effects.default_prevented);
        self.apply_requests();
        if !default_prevented {
            self.default_action(&event);
        }
        DispatchOutcome { default_prevented }
    }

    // ---- clock -----------------------------------------------------------

    /// Move the virtual clock forward by `ms`, firing due timers in order and
    /// delivering visibility changes after each one.
    pub fn advance(&mut self, ms: u64) {
        let until = self.scheduler.now().saturating_add(ms);
        self.flush_visibility();
        while let Some(fired) = self.scheduler.pop_due(until) {
            self.fire(fired);
            self.flush_visibility();
        }
        self.scheduler.advance_to(until);
        self.sync_clock();
        self.flush_visibility();
    }

    /// Deliver pending visibility changes and anything due right now.
    pub fn settle(&mut self) {
        self.advance(0);
    }

    /// Advance until no timers remain or `limit_ms` has passed.
    pub fn run_until_idle(&mut self, limit_ms: u64) {
        let deadline = self.scheduler.now().saturating_add(limit_ms);
        while let Some(due) = self.scheduler.next_due() {
            if due > deadline {
                break;
            }
            let step = due.saturating_sub(self.scheduler.now());
            self.advance(step);
        }
        self.settle();
    }

    fn fire(&mut self, fired: FiredTimer) {
        self.sync_clock();
        match fired.owner {
            TimerOwner::Behavior(index) => {
                let mut behaviors = mem::take(&mut self.behaviors);
                self.invoke(&mut behaviors, index, Hook::Timer(fired.id));
                self.behaviors = behaviors;
                self.apply_requests();
            }
            TimerOwner::Notifier => self.notifier.on_timer(&mut self.document, fired.id),
            TimerOwner::ScrollAnimation => self.step_scroll_animation(fired.id),
        }
    }

    fn sync_clock(&mut self) {
        self.document.set_clock(self.scheduler.now());
    }

    // ---- behaviors -------------------------------------------------------

    fn invoke(&mut self, behaviors: &mut [Box<dyn Behavior>], index: usize, hook: Hook<'_>) {
        self.call(behaviors, index, &hook);
        self.route_signals(behaviors);
    }

    fn call(&mut self, behaviors: &mut [Box<dyn Behavior>], index: usize, hook: &Hook<'_>) {
        self.refresh_layout();
        let Some(behavior) = behaviors.get_mut(index) else {
            return;
        };
        let mut cx = PageContext {
            doc: &mut self.document,
            layout: &self.layout,
            viewport: &self.viewport,
            config: &self.config,
            scheduler: &mut self.scheduler,
            observers: &mut self.observers,
            notifier: &mut self.notifier,
            effects: &mut self.effects,
            owner: index,
        };
        match hook {
            Hook::Init => behavior.init(&mut cx),
            Hook::Event(event) => behavior.on_event(&mut cx, event),
            Hook::Timer(timer) => behavior.on_timer(&mut cx, *timer),
            Hook::Visibility(entries) => behavior.on_visibility(&mut cx, entries),
            Hook::Signal(signal) => behavior.on_signal(&mut cx, signal),
        }
    }

    /// Signals reach every behavior except their emitter, before the
    /// emitting hook's caller continues.
    fn route_signals(&mut self, behaviors: &mut [Box<dyn Behavior>]) {
        while !self.effects.signals.is_empty() {
            let (emitter, signal) = self.effects.signals.remove(0);
            let from = behaviors.get(emitter).map_or("unknown", |b| b.name());
            debug!(?signal, from, "signal");
            for index in 0..behaviors.len() {
                if index != emitter {
                    self.call(behaviors, index, &Hook::Signal(&signal));
                }
            }
        }
    }

    fn flush_visibility(&mut self) {
        self.refresh_layout();
        if !self.observers.is_dirty() {
            return;
        }
        let batches = self.observers.evaluate(&self.layout, &self.viewport);
        if batches.is_empty() {
            return;
        }
        let mut behaviors = mem::take(&mut self.behaviors);
        for (owner, entries) in &batches {
            self.invoke(&mut behaviors, *owner, Hook::Visibility(entries));
        }
        self.behaviors = behaviors;
        self.apply_requests();
    }

    fn apply_requests(&mut self) {
        for request in mem::take(&mut self.effects.requests) {
            match request {
                Request::ScrollTo { y, smooth } => self.scroll_to(y, smooth),
                Request::Navigate { href } => self.navigate(href),
            }
        }
    }

    // ---- layout & scrolling ----------------------------------------------

    fn refresh_layout(&mut self) {
        let revision = self.document.revision();
        if self.layout_revision == Some(revision) {
            return;
        }
        let params = BlockLayout {
            viewport_width: self.viewport.width,
            line_height: self.config.layout.line_height,
            char_width: self.config.layout.char_width,
            default_block_height: self.config.layout.default_block_height,
        };
        self.layout = params.compute(&self.document);
        self.layout_revision = Some(revision);
        self.observers.mark_dirty();
    }

    fn apply_scroll(&mut self, y: f64) {
        self.refresh_layout();
        if self.viewport.set_scroll_y(y, &self.layout) {
            let y = self.viewport.scroll_y();
            self.document.record(Mutation::Scroll { y });
            self.observers.mark_dirty();
        }
    }

    /// `window.scrollTo`. Smooth scrolls animate along the configured curve,
    /// emitting a scroll event every frame.
    fn scroll_to(&mut self, y: f64, smooth: bool) {
        self.refresh_layout();
        self.cancel_scroll_animation();
        let to = self.viewport.clamp_scroll(y, &self.layout);
        let from = self.viewport.scroll_y();
        if to == from {
            return;
        }
        let duration_ms = self.config.navigation.smooth_scroll_ms;
        if !smooth || duration_ms == 0 {
            self.dispatch(PageEvent::Scroll { y: to });
            return;
        }
        let timer = self
            .scheduler
            .set_interval(TimerOwner::ScrollAnimation, self.config.viewport.frame_ms);
        debug!(from, to, duration_ms, "smooth scroll");
        self.scroll_animation = Some(ScrollAnimation {
            timer,
            from,
            to,
            started_ms: self.scheduler.now(),
            duration_ms,
            easing: self.scroll_easing,
        });
    }

    fn step_scroll_animation(&mut self, timer: TimerId) {
        let Some(animation) = self.scroll_animation else {
            self.scheduler.cancel(timer);
            return;
        };
        if animation.timer != timer {
            self.scheduler.cancel(timer);
            return;
        }
        let elapsed = self.scheduler.now().saturating_sub(animation.started_ms);
        let progress = (elapsed as f64 / animation.duration_ms as f64).min(1.0);
        let y = if progress >= 1.0 {
            self.cancel_scroll_animation();
            animation.to
        } else {
            animation.from + (animation.to - animation.from) * animation.easing.evaluate(progress)
        };
        self.dispatch(PageEvent::Scroll { y });
    }

    fn cancel_scroll_animation(&mut self) {
        if let Some(animation) = self.scroll_animation.take() {
            self.scheduler.cancel(animation.timer);
        }
    }

    fn navigate(&mut self, href: String) {
        info!(%href, "navigation requested");
        self.sync_clock();
        self.document.record(Mutation::Navigate { href: href.clone() });
        self.navigations.push(href);
    }

    // ---- default actions -------------------------------------------------

    fn default_action(&mut self, event: &PageEvent) {
        match event {
            PageEvent::Click { target } => self.click_default(*target),
            PageEvent::Submit { form } => {
                let href = self
                    .document
                    .attr(*form, "action")
                    .filter(|action| !action.is_empty())
                    .unwrap_or(self.document.location())
                    .to_string();
                self.navigate(href);
            }
            _ => {}
        }
    }

    fn click_default(&mut self, target: NodeId) {
        if let Some(link) = self.closest(target, |doc, node| {
            doc.element(node)
                .is_some_and(|el| el.tag == "a" && el.attr("href").is_some())
        }) {
            let href = self.document.attr(link, "href").unwrap_or("").to_string();
            self.follow_link(&href);
            return;
        }

        let Some(control) = self.closest(target, |doc, node| {
            doc.element(node)
                .is_some_and(|el| el.tag == "input" || el.tag == "button")
        }) else {
            return;
        };
        let Some(el) = self.document.element(control) else {
            return;
        };
        let tag = el.tag.clone();
        let kind = el.attr("type").unwrap_or("").to_ascii_lowercase();
        let (checked, disabled) = (el.is_checked(), el.is_disabled());
        match (tag.as_str(), kind.as_str()) {
            ("input", "checkbox") => self.set_checked(control, !checked),
            ("input", "radio") => self.set_checked(control, true),
            ("input", "submit") | ("button", "submit") | ("button", "") => {
                if disabled {
                    return;
                }
                let form = self.closest(control, |doc, node| {
                    doc.element(node).is_some_and(|el| el.tag == "form")
                });
                if let Some(form) = form {
                    self.submit(form);
                }
            }
            _ => {}
        }
    }

    fn follow_link(&mut self, href: &str) {
        match href.strip_prefix('#') {
            Some("") => self.scroll_to(0.0, false),
            Some(_) => {
                let target = Selector::parse(href)
                    .ok()
                    .and_then(|selector| self.document.query(&selector));
                if let Some(target) = target {
                    self.refresh_layout();
                    let y = self.layout.offset_top(target);
                    self.scroll_to(y, false);
                }
            }
            None if href.is_empty() => {}
            None => self.navigate(href.to_string()),
        }
    }

    fn closest(
        &self,
        from: NodeId,
        predicate: impl Fn(&Document, NodeId) -> bool,
    ) -> Option<NodeId> {
        let mut current = Some(from);
        while let Some(node) = current {
            if predicate(&self.document, node) {
                return Some(node);
            }
            current = self.document.parent(node);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every hook it sees.
    #[derive(Default)]
    struct Recorder {
        seen: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
        timer: Option<TimerId>,
        emit_on_click: bool,
    }

    impl Behavior for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn init(&mut self, cx: &mut PageContext<'_>) {
            self.seen.borrow_mut().push("init".into());
            self.timer = Some(cx.set_timeout(100));
        }

        fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
            self.seen.borrow_mut().push(event.name().into());
            if self.emit_on_click && matches!(event, PageEvent::Click { .. }) {
                cx.emit(Signal::CollapseAccordion);
                cx.prevent_default();
            }
        }

        fn on_timer(&mut self, cx: &mut PageContext<'_>, timer: TimerId) {
            assert_eq!(Some(timer), self.timer);
            self.seen.borrow_mut().push(format!("timer@{}", cx.now()));
        }

        fn on_signal(&mut self, _cx: &mut PageContext<'_>, signal: &Signal) {
            self.seen.borrow_mut().push(format!("{signal:?}"));
        }
    }

    fn tall_page() -> Document {
        Document::parse(
            r##"<body>
                <a id="top-link" href="#">top</a>
                <a id="jump" href="#far">far</a>
                <a id="away" href="about.html">about</a>
                <div data-height="3000"></div>
                <section id="far" data-height="400"></section>
            </body>"##,
        )
    }

    #[test]
    fn hooks_run_in_order_and_signals_skip_the_emitter() {
        let first = Recorder {
            emit_on_click: true,
            ..Recorder::default()
        };
        let second = Recorder::default();
        let first_log = first.seen.clone();
        let second_log = second.seen.clone();

        let mut page = Page::with_behaviors(
            tall_page(),
            VistaConfig::default(),
            vec![Box::new(first), Box::new(second)],
        );
        let link = page.document().by_id("away").unwrap();
        let outcome = page.click(link);
        assert!(outcome.default_prevented);
        assert!(page.navigations().is_empty());

        page.advance(150);
        assert_eq!(*first_log.borrow(), vec!["init", "click", "timer@100"]);
        assert_eq!(
            *second_log.borrow(),
            vec!["init", "CollapseAccordion", "click", "timer@100"]
        );
    }

    #[test]
    fn unprevented_links_follow_their_default_action() {
        let mut page = Page::with_behaviors(tall_page(), VistaConfig::default(), Vec::new());

        let jump = page.document().by_id("jump").unwrap();
        page.click(jump);
        // The links share a 24px line, so the document is 3424px tall and
        // `#far` at 3024 clamps to the last reachable offset.
        assert_eq!(page.viewport().scroll_y(), 3424.0 - 800.0);

        let top = page.document().by_id("top-link").unwrap();
        page.click(top);
        assert_eq!(page.viewport().scroll_y(), 0.0);

        let away = page.document().by_id("away").unwrap();
        page.click(away);
        assert_eq!(page.navigations(), ["about.html".to_string()]);
    }

    #[test]
    fn smooth_scroll_animates_to_the_clamped_target() {
        let mut page = Page::with_behaviors(tall_page(), VistaConfig::default(), Vec::new());
        page.scroll_to(1000.0, true);
        assert_eq!(page.viewport().scroll_y(), 0.0);

        page.advance(200);
        let midway = page.viewport().scroll_y();
        assert!(midway > 0.0 && midway < 1000.0, "midway = {midway}");

        page.advance(400);
        assert_eq!(page.viewport().scroll_y(), 1000.0);
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn user_scroll_cancels_smooth_scroll() {
        let mut page = Page::with_behaviors(tall_page(), VistaConfig::default(), Vec::new());
        page.scroll_to(2000.0, true);
        page.advance(100);
        page.scroll(10.0);
        page.advance(1000);
        assert_eq!(page.viewport().scroll_y(), 10.0);
    }

    #[test]
    fn radios_uncheck_their_group() {
        let doc = Document::parse(
            r#"<body><form>
                <input type="radio" name="userType" id="a" value="student" checked>
                <input type="radio" name="userType" id="b" value="parent">
                <input type="checkbox" id="c">
            </form></body>"#,
        );
        let mut page = Page::with_behaviors(doc, VistaConfig::default(), Vec::new());
        let a = page.document().by_id("a").unwrap();
        let b = page.document().by_id("b").unwrap();
        let c = page.document().by_id("c").unwrap();

        page.click(b);
        assert!(!page.document().element(a).unwrap().is_checked());
        assert!(page.document().element(b).unwrap().is_checked());

        page.click(c);
        assert!(page.document().element(c).unwrap().is_checked());
        page.click(c);
        assert!(!page.document().element(c).unwrap().is_checked());
    }
}
