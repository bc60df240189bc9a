//! Site behaviors, one module per feature.

pub mod accordion;
pub mod filter;
pub mod focus;
pub mod login;
pub mod navbar;
pub mod page_transition;
pub mod progress;
pub mod reveal;
pub mod smooth_scroll;
pub mod stats;
pub mod tilt;
pub mod timeline;

use crate::behavior::Behavior;

pub use accordion::{Accordion, AccordionState};
pub use filter::{CategoryFilter, FilterSelection};
pub use focus::InputFocus;
pub use login::{LoginForm, validate_login};
pub use navbar::Navbar;
pub use page_transition::PageTransition;
pub use progress::ScrollProgress;
pub use reveal::RevealOnScroll;
pub use smooth_scroll::SmoothScroll;
pub use stats::{CounterAnimation, CounterFrame, StatsCounter, parse_target};
pub use tilt::CardTilt;

/// The site's behaviors in the order the page script registers them.
///
/// Listeners attached while the script body runs come first, then the
/// `DOMContentLoaded` initializers, then `load` listeners.
pub fn default_behaviors() -> Vec<Box<dyn Behavior>> {
    vec![
        Box::new(InputFocus::default()),
        Box::new(PageTransition::default()),
        Box::new(Navbar::default()),
        Box::new(RevealOnScroll::cards()),
        Box::new(StatsCounter::default()),
        Box::new(LoginForm::default()),
        Box::new(Accordion::default()),
        Box::new(CategoryFilter::default()),
        Box::new(timeline::timeline_reveal()),
        Box::new(SmoothScroll::default()),
        Box::new(CardTilt::default()),
        Box::new(ScrollProgress::default()),
    ]
}
