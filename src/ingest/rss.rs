// src/ingest/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::ingest::types::{FeedItem, FeedSource, FeedSpec};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    // <content:encoded>; the deserializer keys on the local name.
    #[serde(rename = "encoded")]
    content_encoded: Option<String>,
}

// <guid isPermaLink="false">...</guid>: attributes ignored, text kept.
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text")]
    value: Option<String>,
}

/// Parse an RSS 2.0 document into raw items, in feed order.
pub fn parse_rss(xml: &str) -> Result<Vec<FeedItem>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

    let out = rss
        .channel
        .item
        .into_iter()
        .map(|it| FeedItem {
            title: it.title,
            link: it.link,
            guid: it.guid.and_then(|g| g.value),
            description: it
                .description
                .filter(|d| !d.trim().is_empty())
                .or(it.content_encoded),
            pub_date: it.pub_date,
        })
        .collect();

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    Ok(out)
}

/// HTTP-backed feed source.
#[derive(Clone)]
pub struct RssHttpSource {
    client: reqwest::Client,
}

impl RssHttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for RssHttpSource {
    async fn fetch_items(&self, feed: &FeedSpec) -> Result<Vec<FeedItem>> {
        let body = self
            .client
            .get(&feed.url)
            .send()
            .await
            .with_context(|| format!("GET {}", feed.url))?
            .error_for_status()
            .with_context(|| format!("non-2xx from {}", feed.url))?
            .text()
            .await
            .context("reading feed body")?;
        parse_rss(&body)
    }
}

// quick-xml only knows the five XML entities; feeds routinely carry HTML ones.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
