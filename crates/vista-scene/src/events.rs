use serde::{Deserialize, Serialize};
use vista_dom::{Document, NodeId};

/// Input delivered to every behavior, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// `window.load`: every resource is in place.
    Loaded,
    Scroll { y: f64 },
    Resize { width: f64, height: f64 },
    Click { target: NodeId },
    Submit { form: NodeId },
    /// Pointer moved over `target`, in client (viewport) coordinates.
    MouseMove {
        target: NodeId,
        client_x: f64,
        client_y: f64,
    },
    MouseLeave { target: NodeId },
    Focus { target: NodeId },
    Blur { target: NodeId },
    Input { target: NodeId, value: String },
}

impl PageEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loaded => "load",
            Self::Scroll { .. } => "scroll",
            Self::Resize { .. } => "resize",
            Self::Click { .. } => "click",
            Self::Submit { .. } => "submit",
            Self::MouseMove { .. } => "mousemove",
            Self::MouseLeave { .. } => "mouseleave",
            Self::Focus { .. } => "focus",
            Self::Blur { .. } => "blur",
            Self::Input { .. } => "input",
        }
    }

    /// The element a click was dispatched to.
    pub fn click_target(&self) -> Option<NodeId> {
        match self {
            Self::Click { target } => Some(*target),
            _ => None,
        }
    }
}

/// Whether a click on `target` reaches a listener on `listener`.
///
/// Clicks bubble, so a listener on an ancestor sees clicks on its
/// descendants.
pub fn reaches(doc: &Document, listener: NodeId, target: NodeId) -> bool {
    listener == target || doc.is_ancestor(listener, target)
}

/// First of `listeners` that a click on `target` reaches, innermost first.
pub fn closest_listener(doc: &Document, listeners: &[NodeId], target: NodeId) -> Option<NodeId> {
    let mut current = Some(target);
    while let Some(node) = current {
        if listeners.contains(&node) {
            return Some(node);
        }
        current = doc.parent(node);
    }
    None
}
