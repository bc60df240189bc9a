use anyhow::Result;
use vista_config::VistaConfig;
use vista_dom::{Document, NodeId};
use vista_scene::Page;

// Layout at 1280x800: headline 0..24, cards at 900 / 1200 / 1500 (300 tall,
// 400 wide), timeline entries at 1800 / 2000, 3200px in all.
const HOME: &str = r#"
<html><body>
  <section class="hero" data-height="900"><h1 class="fade-in">Welcome</h1></section>
  <section class="features">
    <div class="feature-card" data-aos="fade-up" data-height="300" data-width="400">Projects</div>
    <div class="feature-card" data-aos="fade-up" data-height="300" data-width="400">Mentors</div>
    <div class="feature-card" data-aos="fade-up" data-height="300" data-width="400">Field trips</div>
  </section>
  <section class="timeline">
    <div class="timeline-item" data-height="200">2024</div>
    <div class="timeline-item" data-height="200">2025</div>
  </section>
  <section data-height="1000"></section>
</body></html>
"#;

fn open_with(config: VistaConfig) -> Page {
    let mut page = Page::new(Document::parse(HOME), config);
    page.load();
    page
}

fn open() -> Page {
    open_with(VistaConfig::default())
}

fn select(page: &Page, selector: &str) -> Result<Vec<NodeId>> {
    Ok(page.document().select(selector)?)
}

fn opacity<'a>(page: &'a Page, node: NodeId) -> Option<&'a str> {
    page.document().style(node, "opacity")
}

#[test]
fn feature_cards_get_staggered_delays() -> Result<()> {
    let page = open();
    let cards = select(&page, ".feature-card")?;
    let delays: Vec<_> = cards
        .iter()
        .map(|card| page.document().style(*card, "animation-delay"))
        .collect();
    assert_eq!(delays, vec![Some("0s"), Some("0.1s"), Some("0.2s")]);
    Ok(())
}

#[test]
fn elements_reveal_as_they_scroll_into_view() -> Result<()> {
    let mut page = open();
    let headline = select(&page, ".fade-in")?[0];
    let cards = select(&page, ".feature-card")?;

    assert_eq!(opacity(&page, headline), Some("1"));
    assert_eq!(
        page.document().style(headline, "transform"),
        Some("translateY(0)")
    );
    assert!(cards.iter().all(|card| opacity(&page, *card).is_none()));

    page.scroll(300.0);
    page.settle();
    assert_eq!(opacity(&page, cards[0]), Some("1"));
    assert_eq!(opacity(&page, cards[1]), None);

    // Several scrolls between frames are judged at the final position.
    page.scroll(500.0);
    page.scroll(800.0);
    page.scroll(1000.0);
    page.settle();
    assert_eq!(opacity(&page, cards[1]), Some("1"));
    assert_eq!(opacity(&page, cards[2]), Some("1"));
    Ok(())
}

#[test]
fn revealed_cards_stay_revealed() -> Result<()> {
    let mut page = open();
    let cards = select(&page, ".feature-card")?;

    page.scroll(300.0);
    page.settle();
    page.scroll(2400.0);
    page.settle();
    page.scroll(0.0);
    page.settle();

    assert_eq!(opacity(&page, cards[0]), Some("1"));
    assert_eq!(
        page.document().style(cards[0], "transform"),
        Some("translateY(0)")
    );
    Ok(())
}

#[test]
fn timeline_entries_use_a_deeper_margin() -> Result<()> {
    let mut page = open();
    let items = select(&page, ".timeline-item")?;

    // Viewport bottom at 1900; the 100px margin stops the root at 1800.
    page.scroll(1100.0);
    page.settle();
    assert_eq!(opacity(&page, items[0]), None);

    page.scroll(1200.0);
    page.settle();
    assert_eq!(opacity(&page, items[0]), Some("1"));
    assert_eq!(
        page.document().style(items[0], "transform"),
        Some("translateX(0)")
    );
    assert_eq!(opacity(&page, items[1]), None);
    Ok(())
}

#[test]
fn cards_tilt_under_the_pointer_after_load() -> Result<()> {
    let mut page = Page::new(Document::parse(HOME), VistaConfig::default());
    let card = select(&page, ".feature-card")?[0];

    page.hover(card, 0.0, 900.0);
    assert_eq!(page.document().style(card, "transform"), None);

    page.load();
    page.hover(card, 0.0, 900.0);
    assert_eq!(
        page.document().style(card, "transform"),
        Some("perspective(1000px) rotateX(-15deg) rotateY(20deg) scale(1.02)")
    );

    page.hover(card, 200.0, 1050.0);
    assert_eq!(
        page.document().style(card, "transform"),
        Some("perspective(1000px) rotateX(0deg) rotateY(0deg) scale(1.02)")
    );

    page.leave(card);
    assert_eq!(
        page.document().style(card, "transform"),
        Some("perspective(1000px) rotateX(0) rotateY(0) scale(1)")
    );
    Ok(())
}

fn with_progress() -> VistaConfig {
    let mut config = VistaConfig::default();
    config.progress.enabled = true;
    config
}

fn progress_bar(page: &Page) -> Result<NodeId> {
    let body = page
        .document()
        .body()
        .ok_or_else(|| anyhow::anyhow!("document has no body"))?;
    page.document()
        .children(body)
        .last()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("body is empty"))
}

#[test]
fn progress_bar_is_off_by_default() -> Result<()> {
    let page = open();
    let bar = progress_bar(&page)?;
    assert_eq!(page.document().style(bar, "position"), None);
    Ok(())
}

#[test]
fn progress_bar_tracks_scroll_with_a_throttle() -> Result<()> {
    let mut page = open_with(with_progress());
    let bar = progress_bar(&page)?;
    assert_eq!(page.document().style(bar, "position"), Some("fixed"));

    page.scroll(1200.0);
    assert_eq!(page.document().style(bar, "width"), Some("50%"));

    page.scroll(1300.0);
    assert_eq!(page.document().style(bar, "width"), Some("50%"));

    page.advance(100);
    page.scroll(1800.0);
    assert_eq!(page.document().style(bar, "width"), Some("75%"));
    Ok(())
}

#[test]
fn progress_bar_recomputes_once_resizing_settles() -> Result<()> {
    let mut page = open_with(with_progress());
    let bar = progress_bar(&page)?;

    page.scroll(1200.0);
    page.resize(1280.0, 1200.0);
    page.advance(50);
    page.resize(1280.0, 1600.0);
    page.advance(149);
    assert_eq!(page.document().style(bar, "width"), Some("50%"));

    page.advance(1);
    assert_eq!(page.document().style(bar, "width"), Some("75%"));
    Ok(())
}
