use anyhow::Result;
use vista_config::VistaConfig;
use vista_dom::{Document, NodeId};
use vista_scene::Page;

const SITE: &str = r#"
<html><body>
  <nav>
    <a href="index.html" class="self">Home</a>
    <a href="curriculum.html" class="internal">Curriculum</a>
    <a href="https://example.com/school" class="external">Partner</a>
    <a href="mailto:office@example.com" class="mail">Mail</a>
  </nav>
  <form id="contact" action="thanks.html"><button type="submit" class="send">Send</button></form>
  <form id="search"><input type="submit" class="go" value="Go"></form>
</body></html>
"#;

fn open() -> Page {
    let mut document = Document::parse(SITE);
    document.set_location("site/index.html");
    let mut page = Page::new(document, VistaConfig::default());
    page.load();
    page
}

fn first(page: &Page, selector: &str) -> Result<NodeId> {
    page.document()
        .select_first(selector)?
        .ok_or_else(|| anyhow::anyhow!("nothing matches {selector}"))
}

fn body(page: &Page) -> Result<NodeId> {
    page.document()
        .body()
        .ok_or_else(|| anyhow::anyhow!("document has no body"))
}

#[test]
fn page_fades_in_after_load() -> Result<()> {
    let mut page = open();
    let body = body(&page)?;

    assert_eq!(page.document().style(body, "opacity"), Some("0"));
    page.advance(99);
    assert_eq!(page.document().style(body, "opacity"), Some("0"));
    page.advance(1);
    assert_eq!(page.document().style(body, "opacity"), Some("1"));
    assert_eq!(
        page.document().style(body, "transition"),
        Some("opacity 0.5s ease")
    );
    Ok(())
}

#[test]
fn internal_links_fade_out_before_navigating() -> Result<()> {
    let mut page = open();
    page.advance(100);
    let body = body(&page)?;
    let link = first(&page, ".internal")?;

    let outcome = page.click(link);
    assert!(outcome.default_prevented);
    assert_eq!(page.document().style(body, "opacity"), Some("0"));
    assert_eq!(
        page.document().style(body, "transition"),
        Some("opacity 0.3s ease")
    );

    page.advance(299);
    assert!(page.navigations().is_empty());
    page.advance(1);
    assert_eq!(page.navigations(), ["curriculum.html"]);
    Ok(())
}

#[test]
fn self_and_external_links_navigate_immediately() -> Result<()> {
    let mut page = open();
    let body = body(&page)?;
    page.advance(100);

    for (selector, href) in [
        (".self", "index.html"),
        (".external", "https://example.com/school"),
        (".mail", "mailto:office@example.com"),
    ] {
        let link = first(&page, selector)?;
        let outcome = page.click(link);
        assert!(!outcome.default_prevented, "{selector} was prevented");
        assert_eq!(page.navigations().last().map(String::as_str), Some(href));
    }
    assert_eq!(page.document().style(body, "opacity"), Some("1"));
    Ok(())
}

#[test]
fn unhandled_forms_submit_to_their_action() -> Result<()> {
    let mut page = open();
    let send = first(&page, ".send")?;
    let go = first(&page, ".go")?;

    page.click(send);
    page.click(go);
    assert_eq!(page.navigations(), ["thanks.html", "site/index.html"]);
    Ok(())
}
