//! 3D tilt on cards following the pointer, installed once the page loads.

use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::events::{PageEvent, closest_listener};

const CARD_SELECTOR: &str = ".feature-card, .award-card, .vision-card";
const RESTING: &str = "perspective(1000px) rotateX(0) rotateY(0) scale(1)";

/// Transform for a pointer at `(x, y)` inside a `width` x `height` card.
pub fn tilt_transform(x: f64, y: f64, width: f64, height: f64) -> String {
    let rotate_x = (y - height / 2.0) / 10.0;
    let rotate_y = (width / 2.0 - x) / 10.0;
    format!("perspective(1000px) rotateX({rotate_x}deg) rotateY({rotate_y}deg) scale(1.02)")
}

#[derive(Debug, Default)]
pub struct CardTilt {
    cards: Vec<NodeId>,
    installed: bool,
}

impl Behavior for CardTilt {
    fn name(&self) -> &'static str {
        "tilt"
    }

    fn init(&mut self, _cx: &mut PageContext<'_>) {}

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        match event {
            PageEvent::Loaded if !self.installed => {
                self.cards = cx.query_all(CARD_SELECTOR);
                self.installed = true;
            }
            PageEvent::MouseMove {
                target,
                client_x,
                client_y,
            } => {
                let Some(card) = closest_listener(cx.doc, &self.cards, *target) else {
                    return;
                };
                let Some(geometry) = cx.layout.geometry(card) else {
                    return;
                };
                let (left, top, width, height) = cx.viewport.client_rect(&geometry);
                let transform = tilt_transform(client_x - left, client_y - top, width, height);
                cx.doc.set_style(card, "transform", &transform);
            }
            // `mouseleave` does not bubble.
            PageEvent::MouseLeave { target } if self.cards.contains(target) => {
                cx.doc.set_style(*target, "transform", RESTING);
            }
            _ => {}
        }
    }
}
