use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::DomError;
use crate::mutation::{Journal, JournalEntry, Mutation};
use crate::selector::Selector;

/// Index of an element in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// One element of the document.
///
/// Text is the element's own text runs, whitespace-collapsed. Use
/// [`Document::text_content`] for the text of the whole subtree.
#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) classes: Vec<String>,
    pub(crate) style: Vec<(String, String)>,
    pub(crate) text: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) checked: bool,
    pub(crate) disabled: bool,
    pub(crate) value: String,
}

impl Element {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style
            .iter()
            .find(|(key, _)| key == property)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Arena-backed document with a mutation journal.
///
/// Elements are stored in document (pre-)order, so arena order doubles as
/// tree order for query results. Mutations that change nothing are not
/// journaled.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    root: NodeId,
    location: String,
    journal: Journal,
    now_ms: u64,
    revision: u64,
}

impl Document {
    pub(crate) fn from_elements(elements: Vec<Element>) -> Self {
        Self {
            elements,
            root: NodeId(0),
            location: String::new(),
            journal: Journal::new(),
            now_ms: 0,
            revision: 0,
        }
    }

    /// Parse an HTML document.
    pub fn parse(html: &str) -> Self {
        crate::html::parse_document(html)
    }

    /// Read and parse an HTML file. The file name becomes the page location.
    pub fn from_file(path: &Path) -> Result<Self, DomError> {
        let html = std::fs::read_to_string(path).map_err(|source| DomError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut document = Self::parse(&html);
        document.location = path.to_string_lossy().into_owned();
        Ok(document)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Current page path (`window.location.pathname`).
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// Last path segment of the location, as compared against link hrefs.
    pub fn current_page(&self) -> &str {
        self.location.rsplit('/').next().unwrap_or("")
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.elements.len()).map(NodeId)
    }

    pub fn body(&self) -> Option<NodeId> {
        self.node_ids()
            .find(|id| self.elements[id.0].tag == "body")
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.node_ids()
            .find(|node| self.elements[node.0].id() == Some(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id).and_then(Element::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.element(id).map(Element::children).unwrap_or(&[])
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.has_class(class))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.style(property))
    }

    /// Concatenated, whitespace-collapsed text of the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        self.collect_text(id, &mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, id: NodeId, parts: &mut Vec<&'a str>) {
        let Some(el) = self.element(id) else {
            return;
        };
        if !el.text.is_empty() {
            parts.push(&el.text);
        }
        for child in &el.children {
            self.collect_text(*child, parts);
        }
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    /// Short description used in journals and logs, e.g. `button#go.btn`.
    pub fn describe(&self, id: NodeId) -> String {
        let Some(el) = self.element(id) else {
            return format!("#{}", id.0);
        };
        let mut out = el.tag.clone();
        if let Some(html_id) = el.id() {
            out.push('#');
            out.push_str(html_id);
        }
        for class in &el.classes {
            out.push('.');
            out.push_str(class);
        }
        out
    }

    // ---- querying --------------------------------------------------------

    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.node_ids()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    pub fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.node_ids().find(|id| selector.matches(self, *id))
    }

    /// Descendants of `scope` matching `selector` (`scope.querySelectorAll`).
    pub fn query_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.node_ids()
            .filter(|id| self.is_ancestor(scope, *id) && selector.matches(self, *id))
            .collect()
    }

    pub fn query_first_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.node_ids()
            .find(|id| self.is_ancestor(scope, *id) && selector.matches(self, *id))
    }

    /// Parse `selector` and return all matches.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        Ok(self.query_all(&Selector::parse(selector)?))
    }

    /// Parse `selector` and return the first match.
    pub fn select_first(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query(&Selector::parse(selector)?))
    }

    // ---- mutation --------------------------------------------------------

    /// Current virtual time stamped onto journal entries.
    pub fn set_clock(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
    }

    /// Bumped on every effective mutation; used to invalidate layout.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Record a page-level mutation that does not touch an element.
    pub fn record(&mut self, mutation: Mutation) {
        let target = mutation.node().map(|node| self.describe(node));
        trace!(at_ms = self.now_ms, ?mutation, "dom mutation");
        self.journal.push(JournalEntry {
            at_ms: self.now_ms,
            target,
            mutation,
        });
        self.revision += 1;
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(el) = self.elements.get_mut(id.0) else {
            return false;
        };
        if el.has_class(class) {
            return false;
        }
        el.classes.push(class.to_string());
        self.record(Mutation::AddClass {
            node: id,
            class: class.to_string(),
        });
        true
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(el) = self.elements.get_mut(id.0) else {
            return false;
        };
        let before = el.classes.len();
        el.classes.retain(|candidate| candidate != class);
        if el.classes.len() == before {
            return false;
        }
        self.record(Mutation::RemoveClass {
            node: id,
            class: class.to_string(),
        });
        true
    }

    /// `classList.toggle`; returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            self.remove_class(id, class);
            false
        } else {
            self.add_class(id, class)
        }
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        match el.style.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) if existing == value => return,
            Some((_, existing)) => *existing = value.to_string(),
            None => el.style.push((property.to_string(), value.to_string())),
        }
        self.record(Mutation::SetStyle {
            node: id,
            property: property.to_string(),
            value: value.to_string(),
        });
    }

    pub fn clear_style(&mut self, id: NodeId, property: &str) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        let before = el.style.len();
        el.style.retain(|(key, _)| key != property);
        if el.style.len() == before {
            return;
        }
        self.record(Mutation::ClearStyle {
            node: id,
            property: property.to_string(),
        });
    }

    /// `textContent = text`: replaces own text and drops children.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        if el.text == text && el.children.is_empty() {
            return;
        }
        el.text = text.to_string();
        // Detached children stay in the arena but are no longer reachable.
        let detached = std::mem::take(&mut el.children);
        for child in detached {
            if let Some(child_el) = self.elements.get_mut(child.0) {
                child_el.parent = None;
            }
        }
        self.record(Mutation::SetText {
            node: id,
            text: text.to_string(),
        });
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        match el
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) if existing == value => return,
            Some((_, existing)) => *existing = value.to_string(),
            None => el.attrs.push((name.to_string(), value.to_string())),
        }
        if name.eq_ignore_ascii_case("class") {
            el.classes = value.split_whitespace().map(str::to_string).collect();
        }
        self.record(Mutation::SetAttribute {
            node: id,
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        self.set_flag(id, "checked", checked);
    }

    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        self.set_flag(id, "disabled", disabled);
    }

    fn set_flag(&mut self, id: NodeId, name: &str, value: bool) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        let slot = match name {
            "checked" => &mut el.checked,
            _ => &mut el.disabled,
        };
        if *slot == value {
            return;
        }
        *slot = value;
        self.record(Mutation::SetFlag {
            node: id,
            name: name.to_string(),
            value,
        });
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        if el.value == value {
            return;
        }
        el.value = value.to_string();
        self.record(Mutation::SetValue {
            node: id,
            value: value.to_string(),
        });
    }

    /// `document.createElement(tag)` + `parent.appendChild(..)`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        if parent.0 >= self.elements.len() {
            return None;
        }
        let id = NodeId(self.elements.len());
        let mut el = Element::new(tag);
        el.parent = Some(parent);
        self.elements.push(el);
        self.elements[parent.0].children.push(id);
        self.record(Mutation::AppendElement {
            parent,
            node: id,
            tag: tag.to_ascii_lowercase(),
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::parse(
            r##"<html><body>
                <nav class="navbar"><a class="nav-link" href="#about">About</a></nav>
                <div id="stats"><span class="stat-number" data-target="150">0</span></div>
            </body></html>"##,
        )
    }

    #[test]
    fn class_mutations_are_idempotent() {
        let mut doc = sample();
        let nav = doc.select_first(".navbar").unwrap().unwrap();

        assert!(doc.add_class(nav, "scrolled"));
        assert!(!doc.add_class(nav, "scrolled"));
        assert_eq!(doc.journal().len(), 1);

        assert!(doc.remove_class(nav, "scrolled"));
        assert!(!doc.remove_class(nav, "scrolled"));
        assert_eq!(doc.journal().len(), 2);
    }

    #[test]
    fn toggle_reports_presence() {
        let mut doc = sample();
        let nav = doc.select_first(".navbar").unwrap().unwrap();
        assert!(doc.toggle_class(nav, "active"));
        assert!(!doc.toggle_class(nav, "active"));
        assert!(!doc.has_class(nav, "active"));
    }

    #[test]
    fn style_set_and_clear() {
        let mut doc = sample();
        let stat = doc.select_first(".stat-number").unwrap().unwrap();
        doc.set_style(stat, "opacity", "0");
        doc.set_style(stat, "opacity", "1");
        doc.set_style(stat, "opacity", "1");
        assert_eq!(doc.style(stat, "opacity"), Some("1"));
        assert_eq!(doc.journal().len(), 2);

        doc.clear_style(stat, "opacity");
        doc.clear_style(stat, "opacity");
        assert_eq!(doc.style(stat, "opacity"), None);
        assert_eq!(doc.journal().len(), 3);
    }

    #[test]
    fn journal_entries_carry_clock_and_target() {
        let mut doc = sample();
        let stat = doc.select_first(".stat-number").unwrap().unwrap();
        doc.set_clock(48);
        doc.set_text(stat, "7");

        let entry = doc.journal().entries().last().unwrap();
        assert_eq!(entry.at_ms, 48);
        assert_eq!(entry.target.as_deref(), Some("span.stat-number"));
        assert_eq!(doc.text_content(stat), "7");
    }

    #[test]
    fn mutations_on_unknown_nodes_are_ignored() {
        let mut doc = sample();
        let ghost = NodeId(10_000);
        assert!(!doc.add_class(ghost, "x"));
        doc.set_style(ghost, "opacity", "1");
        doc.set_text(ghost, "x");
        assert!(doc.journal().is_empty());
        assert!(doc.append_element(ghost, "div").is_none());
    }

    #[test]
    fn current_page_is_last_path_segment() {
        let mut doc = sample();
        doc.set_location("/site/pages/plan.html");
        assert_eq!(doc.current_page(), "plan.html");
    }

    #[test]
    fn append_element_links_parent() {
        let mut doc = sample();
        let body = doc.body().unwrap();
        let bar = doc.append_element(body, "DIV").unwrap();
        assert_eq!(doc.parent(bar), Some(body));
        assert_eq!(doc.children(body).last(), Some(&bar));
        assert_eq!(doc.element(bar).unwrap().tag, "div");
    }
}
