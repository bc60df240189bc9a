use vista_dom::NodeId;

use crate::behavior::{Behavior, PageContext};
use crate::events::PageEvent;

/// Lifts a form field's wrapper while the field has focus.
#[derive(Debug, Default)]
pub struct InputFocus {
    inputs: Vec<NodeId>,
}

impl Behavior for InputFocus {
    fn name(&self) -> &'static str {
        "input-focus"
    }

    fn init(&mut self, cx: &mut PageContext<'_>) {
        self.inputs = cx.query_all(".form-input");
    }

    fn on_event(&mut self, cx: &mut PageContext<'_>, event: &PageEvent) {
        match event {
            PageEvent::Focus { target } if self.inputs.contains(target) => {
                if let Some(wrapper) = cx.doc.parent(*target) {
                    cx.doc.set_style(wrapper, "transform", "translateY(-2px)");
                    cx.doc.set_style(wrapper, "transition", "transform 0.3s ease");
                }
            }
            PageEvent::Blur { target } if self.inputs.contains(target) => {
                if let Some(wrapper) = cx.doc.parent(*target) {
                    cx.doc.set_style(wrapper, "transform", "translateY(0)");
                }
            }
            _ => {}
        }
    }
}
