use vista_config::ViewportConfig;
use vista_dom::{Geometry, Layout};

/// The visible window onto the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    pub fn from_config(config: &ViewportConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// `window.scrollY`.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Largest reachable scroll offset for a document of `document_height`.
    pub fn max_scroll(&self, document_height: f64) -> f64 {
        (document_height - self.height).max(0.0)
    }

    pub fn clamp_scroll(&self, y: f64, layout: &Layout) -> f64 {
        y.clamp(0.0, self.max_scroll(layout.document_height()))
    }

    /// Scroll to `y` (clamped). Returns whether the offset changed.
    pub(crate) fn set_scroll_y(&mut self, y: f64, layout: &Layout) -> bool {
        let clamped = self.clamp_scroll(y, layout);
        if clamped == self.scroll_y {
            return false;
        }
        self.scroll_y = clamped;
        true
    }

    pub(crate) fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Client-space rect (`getBoundingClientRect`) as `(left, top, width, height)`.
    pub fn client_rect(&self, geometry: &Geometry) -> (f64, f64, f64, f64) {
        (
            geometry.left,
            geometry.top - self.scroll_y,
            geometry.width,
            geometry.height,
        )
    }
}
