use super::reveal::{RevealKind, RevealOnScroll};

/// Reveal for `.timeline-item` entries: slide in from the side once they
/// clear the bottom 100px of the viewport.
pub fn timeline_reveal() -> RevealOnScroll {
    RevealOnScroll::new(RevealKind::Timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Behavior;

    #[test]
    fn registers_under_its_own_name() {
        assert_eq!(timeline_reveal().name(), "timeline");
        assert!(timeline_reveal().revealed().is_empty());
    }
}
