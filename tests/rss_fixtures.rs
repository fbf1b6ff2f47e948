use opportunities_bot::ingest::rss::parse_rss;

// Use a 'static fixture via include_str! like the live feeds would deliver it.
const SCHOLARSHIPS_XML: &str = include_str!("fixtures/scholarships_rss.xml");
const TECH_XML: &str = include_str!("fixtures/tech_rss.xml");

#[test]
fn scholarships_fixture_parses_in_feed_order() {
    let items = parse_rss(SCHOLARSHIPS_XML).expect("scholarships parse ok");
    assert_eq!(items.len(), 4);
    assert!(items[0]
        .title
        .as_deref()
        .unwrap_or_default()
        .starts_with("Mastercard Foundation"));
    assert_eq!(
        items[0].guid.as_deref(),
        Some("https://opportunitydesk.org/?p=101")
    );
    assert_eq!(items[3].guid, None);
    assert!(
        items.iter().all(|i| i.permalink().is_some()),
        "every fixture item should carry a link"
    );
}

#[test]
fn tech_fixture_keeps_escaped_markup_for_later_cleaning() {
    let items = parse_rss(TECH_XML).expect("tech parse ok");
    assert_eq!(items.len(), 2);
    let desc = items[0].description.as_deref().unwrap_or_default();
    assert!(desc.contains("<b>async</b>"), "{desc}");
}

#[test]
fn wordpress_body_fills_an_empty_description() {
    let items = parse_rss(SCHOLARSHIPS_XML).expect("scholarships parse ok");
    assert_eq!(
        items[1].description.as_deref(),
        Some("<p>One-year <em>master's degree</em> in the UK.</p>")
    );
    // Empty description and no body: stays empty for the placeholder.
    assert!(items[2]
        .description
        .as_deref()
        .unwrap_or_default()
        .trim()
        .is_empty());
}
