//! HTML loading on top of `scraper`'s html5ever tree.

use ego_tree::NodeRef;
use scraper::{Html, Node};
use tracing::debug;

use crate::document::{Document, Element, NodeId};

/// Parse `html` into a [`Document`].
///
/// Comments, doctypes and processing instructions are dropped. Text inside
/// `script` and `style` is not kept as element text.
pub fn parse_document(html: &str) -> Document {
    let parsed = Html::parse_document(html);
    let mut elements = Vec::new();
    // `root_element` is the <html> element; its NodeRef walks the whole tree.
    let root: NodeRef<'_, Node> = *parsed.root_element();
    convert(root, None, &mut elements);
    if elements.is_empty() {
        elements.push(Element::new("html"));
    }
    debug!(elements = elements.len(), "parsed html document");
    Document::from_elements(elements)
}

fn convert(node: NodeRef<'_, Node>, parent: Option<NodeId>, out: &mut Vec<Element>) {
    let Node::Element(source) = node.value() else {
        return;
    };
    let id = NodeId(out.len());
    let mut element = Element::new(source.name());
    element.parent = parent;
    for (name, value) in source.attrs() {
        element.attrs.push((name.to_string(), value.to_string()));
    }
    element.classes = source.classes().map(str::to_string).collect();
    if let Some(inline) = source.attr("style") {
        element.style = parse_declarations(inline);
    }
    element.checked = source.attr("checked").is_some();
    element.disabled = source.attr("disabled").is_some();
    element.value = source.attr("value").unwrap_or_default().to_string();
    let keeps_text = !matches!(element.tag.as_str(), "script" | "style");
    out.push(element);

    if let Some(parent) = parent {
        out[parent.0].children.push(id);
    }

    let mut runs = Vec::new();
    for child in node.children() {
        match child.value() {
            Node::Element(_) => convert(child, Some(id), out),
            Node::Text(text) if keeps_text => {
                let collapsed = collapse_whitespace(text);
                if !collapsed.is_empty() {
                    runs.push(collapsed);
                }
            }
            _ => {}
        }
    }
    out[id.0].text = runs.join(" ");
    if out[id.0].tag == "textarea" && out[id.0].value.is_empty() {
        out[id.0].value = out[id.0].text.clone();
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an inline `style` attribute into ordered declarations.
pub fn parse_declarations(input: &str) -> Vec<(String, String)> {
    input
        .split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name, value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tree_in_document_order() {
        let doc = parse_document(
            r#"<html><head><title>Plan</title><script>var x = 1;</script></head>
            <body><div class="a b"><p>Hello <strong>bold</strong> world</p></div></body></html>"#,
        );
        let tags: Vec<_> = doc
            .node_ids()
            .map(|id| doc.element(id).unwrap().tag.clone())
            .collect();
        assert_eq!(
            tags,
            vec!["html", "head", "title", "script", "body", "div", "p", "strong"]
        );

        let script = doc.select_first("script").unwrap().unwrap();
        assert_eq!(doc.element(script).unwrap().text(), "");

        let p = doc.select_first("p").unwrap().unwrap();
        assert_eq!(doc.element(p).unwrap().text(), "Hello world");
        assert_eq!(doc.text_content(p), "Hello world bold");

        let div = doc.select_first("div").unwrap().unwrap();
        assert!(doc.has_class(div, "a"));
        assert!(doc.has_class(div, "b"));
    }

    #[test]
    fn reads_form_state_and_inline_style() {
        let doc = parse_document(
            r#"<form><input type="radio" name="userType" value="student" checked>
            <button class="btn-login" disabled style="opacity: 0.5; transform:none">Go</button></form>"#,
        );
        let radio = doc.select_first("input").unwrap().unwrap();
        let el = doc.element(radio).unwrap();
        assert!(el.is_checked());
        assert_eq!(el.value(), "student");

        let button = doc.select_first(".btn-login").unwrap().unwrap();
        assert!(doc.element(button).unwrap().is_disabled());
        assert_eq!(doc.style(button, "opacity"), Some("0.5"));
        assert_eq!(doc.style(button, "transform"), Some("none"));
    }

    #[test]
    fn declarations_skip_malformed_entries() {
        let parsed = parse_declarations("color: red;; width ; HEIGHT: 3px");
        assert_eq!(
            parsed,
            vec![
                ("color".to_string(), "red".to_string()),
                ("height".to_string(), "3px".to_string()),
            ]
        );
    }
}
