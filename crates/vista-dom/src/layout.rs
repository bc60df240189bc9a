//! Headless block-flow layout.
//!
//! Produces the geometry page behaviors read from a live DOM
//! (`offsetTop`, `offsetHeight`, `scrollHeight`) without a rendering engine:
//!
//! - block elements stack vertically inside their parent,
//! - inline elements share lines with their parent's text,
//! - text wraps at `box_width / char_width` characters per line,
//! - `data-height="N"` / `data-width="N"` fix an element's box size,
//! - an inline `max-height` clamps the box but not its `scroll_height`,
//!   which is never smaller than a fixed `data-height`,
//! - `hidden` (attribute or class) and non-rendered tags collapse to zero.

use std::collections::HashMap;

use crate::document::{Document, NodeId};

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "br", "button", "code", "em", "i", "img", "input", "label", "select",
    "small", "span", "strong", "sub", "sup", "textarea",
];

const NON_RENDERED_TAGS: &[&str] = &[
    "head", "link", "meta", "script", "style", "template", "title", "noscript",
];

/// Box geometry of one element, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Natural content extent, ignoring any height clamp.
    pub scroll_height: f64,
}

impl Geometry {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Layout parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockLayout {
    pub viewport_width: f64,
    pub line_height: f64,
    pub char_width: f64,
    pub default_block_height: f64,
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            line_height: 24.0,
            char_width: 8.0,
            default_block_height: 0.0,
        }
    }
}

/// Computed geometry for every rendered element.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    boxes: HashMap<NodeId, Geometry>,
    document_height: f64,
}

impl Layout {
    pub fn geometry(&self, id: NodeId) -> Option<Geometry> {
        self.boxes.get(&id).copied()
    }

    /// `offsetTop` relative to the document.
    pub fn offset_top(&self, id: NodeId) -> f64 {
        self.geometry(id).map(|g| g.top).unwrap_or(0.0)
    }

    pub fn scroll_height(&self, id: NodeId) -> f64 {
        self.geometry(id).map(|g| g.scroll_height).unwrap_or(0.0)
    }

    /// Total scrollable height of the document.
    pub fn document_height(&self) -> f64 {
        self.document_height
    }
}

impl BlockLayout {
    pub fn compute(&self, doc: &Document) -> Layout {
        let mut layout = Layout::default();
        let height = self.block(doc, doc.root(), 0.0, 0.0, self.viewport_width, &mut layout);
        layout.document_height = height;
        layout
    }

    fn lines_for(&self, chars: usize, width: f64) -> f64 {
        if chars == 0 {
            return 0.0;
        }
        let per_line = (width / self.char_width.max(1.0)).floor().max(1.0);
        (chars as f64 / per_line).ceil().max(1.0)
    }

    fn is_collapsed(&self, doc: &Document, id: NodeId) -> bool {
        let Some(el) = doc.element(id) else {
            return true;
        };
        NON_RENDERED_TAGS.contains(&el.tag.as_str())
            || el.attr("hidden").is_some()
            || el.has_class("hidden")
            || el.style("display") == Some("none")
    }

    fn is_inline(&self, doc: &Document, id: NodeId) -> bool {
        doc.element(id).is_some_and(|el| {
            let display = el.style("display");
            match display {
                Some("block") | Some("flex") | Some("grid") => false,
                Some("inline") | Some("inline-block") => true,
                _ => INLINE_TAGS.contains(&el.tag.as_str()),
            }
        })
    }

    /// Lay out a block box at `top`; returns its height.
    fn block(
        &self,
        doc: &Document,
        id: NodeId,
        top: f64,
        left: f64,
        containing_width: f64,
        layout: &mut Layout,
    ) -> f64 {
        if self.is_collapsed(doc, id) {
            self.collapse(doc, id, top, left, layout);
            return 0.0;
        }
        let Some(el) = doc.element(id) else {
            return 0.0;
        };
        let width = el
            .attr("data-width")
            .and_then(parse_px)
            .unwrap_or(containing_width);

        let mut cursor = top;
        let mut run_chars = el.text().chars().count();
        let mut run_top = top;
        for child in el.children() {
            if self.is_collapsed(doc, *child) {
                self.collapse(doc, *child, cursor, left, layout);
                continue;
            }
            if self.is_inline(doc, *child) {
                if run_chars == 0 {
                    run_top = cursor;
                }
                let chars = doc.text_content(*child).chars().count().max(1);
                run_chars += chars;
                self.inline(doc, *child, run_top, left, width, layout);
            } else {
                cursor += self.lines_for(run_chars, width) * self.line_height;
                run_chars = 0;
                cursor += self.block(doc, *child, cursor, left, width, layout);
            }
        }
        cursor += self.lines_for(run_chars, width) * self.line_height;

        let mut content = cursor - top;
        if content == 0.0 {
            content = self.default_block_height;
        }
        let fixed = el.attr("data-height").and_then(parse_px);
        let natural = fixed.unwrap_or(content);
        let scroll_height = fixed.map_or(content, |fixed| content.max(fixed)).max(0.0);
        let height = match el.style("max-height").and_then(parse_px) {
            Some(max) => natural.min(max),
            None => natural,
        };
        layout.boxes.insert(
            id,
            Geometry {
                top,
                left,
                width,
                height,
                scroll_height,
            },
        );
        height
    }

    /// Inline boxes occupy one line at the top of the current run.
    fn inline(
        &self,
        doc: &Document,
        id: NodeId,
        top: f64,
        left: f64,
        containing_width: f64,
        layout: &mut Layout,
    ) {
        let chars = doc.text_content(id).chars().count();
        let lines = self.lines_for(chars, containing_width).max(1.0);
        let height = lines * self.line_height;
        let width = doc
            .attr(id, "data-width")
            .and_then(parse_px)
            .unwrap_or_else(|| (chars as f64 * self.char_width).min(containing_width));
        layout.boxes.insert(
            id,
            Geometry {
                top,
                left,
                width,
                height,
                scroll_height: height,
            },
        );
        for child in doc.children(id) {
            if self.is_collapsed(doc, *child) {
                self.collapse(doc, *child, top, left, layout);
            } else {
                self.inline(doc, *child, top, left, width, layout);
            }
        }
    }

    fn collapse(&self, doc: &Document, id: NodeId, top: f64, left: f64, layout: &mut Layout) {
        layout.boxes.insert(
            id,
            Geometry {
                top,
                left,
                ..Geometry::default()
            },
        );
        for child in doc.children(id) {
            self.collapse(doc, *child, top, left, layout);
        }
    }
}

fn parse_px(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches("px").trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of(html: &str) -> (Document, Layout) {
        let doc = Document::parse(html);
        let layout = BlockLayout {
            viewport_width: 800.0,
            ..BlockLayout::default()
        }
        .compute(&doc);
        (doc, layout)
    }

    #[test]
    fn blocks_stack_vertically() {
        let (doc, layout) = layout_of(
            r#"<body>
                <section id="a" data-height="500"></section>
                <section id="b"><p>one line</p><p>another</p></section>
                <section id="c" data-height="300"></section>
            </body>"#,
        );
        let a = doc.by_id("a").unwrap();
        let b = doc.by_id("b").unwrap();
        let c = doc.by_id("c").unwrap();

        assert_eq!(layout.geometry(a).unwrap().top, 0.0);
        assert_eq!(layout.geometry(a).unwrap().height, 500.0);
        assert_eq!(layout.offset_top(b), 500.0);
        assert_eq!(layout.geometry(b).unwrap().height, 48.0);
        assert_eq!(layout.offset_top(c), 548.0);
        assert_eq!(layout.document_height(), 848.0);
    }

    #[test]
    fn text_wraps_by_viewport_width() {
        // 800 / 8 = 100 chars per line
        let long = "x".repeat(250);
        let (doc, layout) = layout_of(&format!("<body><p id=\"p\">{long}</p></body>"));
        let p = doc.by_id("p").unwrap();
        assert_eq!(layout.geometry(p).unwrap().height, 72.0);
    }

    #[test]
    fn inline_children_share_the_line() {
        let (doc, layout) = layout_of(
            r#"<body><p id="p">Total <span id="s">150</span> students</p></body>"#,
        );
        let p = doc.by_id("p").unwrap();
        let s = doc.by_id("s").unwrap();
        assert_eq!(layout.geometry(p).unwrap().height, 24.0);
        assert_eq!(layout.offset_top(s), 0.0);
        assert_eq!(layout.geometry(s).unwrap().height, 24.0);
    }

    #[test]
    fn max_height_clamps_box_but_not_scroll_height() {
        let (doc, layout) = layout_of(
            r#"<body><div id="c" style="max-height: 10px"><p>a</p><p>b</p><p>c</p></div><div id="after" data-height="5"></div></body>"#,
        );
        let c = doc.by_id("c").unwrap();
        let after = doc.by_id("after").unwrap();
        let geometry = layout.geometry(c).unwrap();
        assert_eq!(geometry.height, 10.0);
        assert_eq!(geometry.scroll_height, 72.0);
        assert_eq!(layout.offset_top(after), 10.0);
    }

    #[test]
    fn fixed_height_counts_towards_scroll_height() {
        let (doc, layout) = layout_of(
            r#"<body>
                <div id="empty" data-height="120" style="max-height: 0px"></div>
                <div id="tall" data-height="30"><p>a</p><p>b</p><p>c</p></div>
            </body>"#,
        );
        let empty = layout.geometry(doc.by_id("empty").unwrap()).unwrap();
        assert_eq!(empty.height, 0.0);
        assert_eq!(empty.scroll_height, 120.0);

        let tall = layout.geometry(doc.by_id("tall").unwrap()).unwrap();
        assert_eq!(tall.height, 30.0);
        assert_eq!(tall.scroll_height, 72.0);
    }

    #[test]
    fn data_width_narrows_the_box_and_its_text() {
        // 160 / 8 = 20 chars per line inside the card
        let (doc, layout) = layout_of(&format!(
            r#"<body><div id="card" data-width="160"><p id="p">{}</p></div></body>"#,
            "y".repeat(50)
        ));
        let card = layout.geometry(doc.by_id("card").unwrap()).unwrap();
        assert_eq!(card.width, 160.0);
        assert_eq!(card.height, 72.0);
        assert_eq!(layout.geometry(doc.by_id("p").unwrap()).unwrap().width, 160.0);
    }

    #[test]
    fn hidden_elements_collapse() {
        let (doc, layout) = layout_of(
            r#"<body><div id="h" class="hidden"><p>gone</p></div><div id="v"><p>here</p></div></body>"#,
        );
        let h = doc.by_id("h").unwrap();
        let v = doc.by_id("v").unwrap();
        assert_eq!(layout.geometry(h).unwrap().height, 0.0);
        assert_eq!(layout.offset_top(v), 0.0);
    }
}
