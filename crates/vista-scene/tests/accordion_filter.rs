use anyhow::Result;
use vista_config::VistaConfig;
use vista_dom::{Document, NodeId};
use vista_scene::Page;

const CURRICULUM: &str = r#"
<html><body>
  <div class="filter-tabs">
    <button class="filter-tab active" data-category="all">All</button>
    <button class="filter-tab" data-category="korean">Korean</button>
    <button class="filter-tab" data-category="math">Math</button>
    <button class="filter-tab" data-category="science">Science</button>
    <button class="filter-tab">Untagged</button>
    <button class="filter-tab" data-category=" ">Blank</button>
  </div>
  <div class="accordion">
    <div class="accordion-item" data-category="korean">
      <div class="accordion-header"><h3>Reading</h3></div>
      <div class="accordion-content"><p>Weekly book.</p><p>Term anthology.</p></div>
    </div>
    <div class="accordion-item" data-category="math science">
      <div class="accordion-header"><h3>Data</h3></div>
      <div class="accordion-content"><p>Statistics.</p></div>
    </div>
    <div class="accordion-item" data-category="science">
      <div class="accordion-header"><h3>Ecology</h3></div>
      <div class="accordion-content"><p>Plants.</p><p>Journals.</p><p>Talks.</p></div>
    </div>
  </div>
</body></html>
"#;

fn open() -> Page {
    let mut page = Page::new(Document::parse(CURRICULUM), VistaConfig::default());
    page.load();
    page
}

fn select(page: &Page, selector: &str) -> Result<Vec<NodeId>> {
    Ok(page.document().select(selector)?)
}

fn active_items(page: &Page, items: &[NodeId]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| page.document().has_class(**item, "active"))
        .map(|(index, _)| index)
        .collect()
}

#[test]
fn first_panel_is_open_after_load() -> Result<()> {
    let page = open();
    let items = select(&page, ".accordion-item")?;
    let contents = select(&page, ".accordion-content")?;

    assert_eq!(active_items(&page, &items), vec![0]);
    assert_eq!(page.document().style(contents[0], "max-height"), Some("48px"));
    assert_eq!(page.document().style(contents[1], "max-height"), None);
    assert_eq!(page.document().style(contents[2], "max-height"), None);
    Ok(())
}

#[test]
fn header_clicks_switch_and_close_panels() -> Result<()> {
    let mut page = open();
    let items = select(&page, ".accordion-item")?;
    let contents = select(&page, ".accordion-content")?;
    let titles = select(&page, ".accordion-header h3")?;

    page.click(titles[1]);
    assert_eq!(active_items(&page, &items), vec![1]);
    assert_eq!(page.document().style(contents[1], "max-height"), Some("24px"));
    assert_eq!(page.document().style(contents[0], "max-height"), None);

    page.click(titles[1]);
    assert!(active_items(&page, &items).is_empty());
    for content in &contents {
        assert_eq!(page.document().style(*content, "max-height"), None);
    }

    page.click(titles[2]);
    assert_eq!(page.document().style(contents[2], "max-height"), Some("72px"));
    Ok(())
}

#[test]
fn at_most_one_panel_is_ever_open() -> Result<()> {
    let mut page = open();
    let items = select(&page, ".accordion-item")?;
    let headers = select(&page, ".accordion-header")?;

    for index in [2, 0, 0, 1, 2, 2, 1, 0, 1] {
        page.click(headers[index]);
        assert!(active_items(&page, &items).len() <= 1);
    }
    Ok(())
}

#[test]
fn filter_tabs_partition_items_and_collapse_the_accordion() -> Result<()> {
    let mut page = open();
    let tabs = select(&page, ".filter-tab")?;
    let items = select(&page, ".accordion-item")?;
    let hidden = |page: &Page| -> Vec<bool> {
        items
            .iter()
            .map(|item| page.document().has_class(*item, "hidden"))
            .collect()
    };

    page.click(tabs[2]);
    assert_eq!(hidden(&page), vec![true, false, true]);
    assert_eq!(
        page.document().style(items[1], "animation"),
        Some("fadeInUp 0.5s ease forwards")
    );
    assert!(active_items(&page, &items).is_empty());
    assert!(page.document().has_class(tabs[2], "active"));
    assert!(!page.document().has_class(tabs[0], "active"));

    page.click(tabs[3]);
    assert_eq!(hidden(&page), vec![true, false, false]);

    page.click(tabs[0]);
    assert_eq!(hidden(&page), vec![false, false, false]);
    assert!(page.document().has_class(tabs[0], "active"));
    assert!(!page.document().has_class(tabs[3], "active"));
    Ok(())
}

#[test]
fn untagged_and_blank_tabs_change_nothing() -> Result<()> {
    let mut page = open();
    let tabs = select(&page, ".filter-tab")?;
    let before = page.document().journal().len();

    for tab in [tabs[4], tabs[5]] {
        let outcome = page.click(tab);
        page.settle();
        assert!(!outcome.default_prevented);
    }

    assert_eq!(page.document().journal().len(), before);
    assert!(!page.document().has_class(tabs[5], "active"));
    Ok(())
}

#[test]
fn fixed_height_panels_open_to_their_full_extent() -> Result<()> {
    let html = r#"<html><body><div class="accordion">
      <div class="accordion-item">
        <div class="accordion-header"><h3>One</h3></div>
        <div class="accordion-content" data-height="120"></div>
      </div>
      <div class="accordion-item">
        <div class="accordion-header"><h3>Two</h3></div>
        <div class="accordion-content" data-height="200"></div>
      </div>
    </div></body></html>"#;
    let mut page = Page::new(Document::parse(html), VistaConfig::default());
    page.load();
    let headers = select(&page, ".accordion-header")?;
    let contents = select(&page, ".accordion-content")?;

    assert_eq!(page.document().style(contents[0], "max-height"), Some("120px"));

    page.click(headers[1]);
    assert_eq!(page.document().style(contents[1], "max-height"), Some("200px"));
    assert_eq!(page.document().style(contents[0], "max-height"), None);
    Ok(())
}
