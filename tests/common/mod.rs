// tests/common/mod.rs
// Shared fakes for integration tests: fixture-backed feeds and a recording messenger.
#![allow(dead_code)]

use anyhow::anyhow;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use opportunities_bot::config::{Pacing, SourceRegistry};
use opportunities_bot::ingest::rss::parse_rss;
use opportunities_bot::ingest::types::{Category, FeedItem, FeedSource, FeedSpec};
use opportunities_bot::notify::{ChatId, Messenger, OutgoingMessage, TelegramError};
use opportunities_bot::{BotState, Destination, Pipeline};

pub const SCHOLARSHIPS_XML: &str = include_str!("../fixtures/scholarships_rss.xml");
pub const TECH_XML: &str = include_str!("../fixtures/tech_rss.xml");

pub const SCHOLARSHIPS_URL: &str = "https://feeds.test/scholarships";
pub const TECH_URL: &str = "https://feeds.test/tech";
pub const BROKEN_URL: &str = "https://feeds.test/broken";

/// Serves fixture XML per URL; unknown URLs fail like a dead host.
#[derive(Default)]
pub struct FixtureFeeds {
    by_url: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FixtureFeeds {
    pub fn standard() -> Self {
        let mut by_url = HashMap::new();
        by_url.insert(SCHOLARSHIPS_URL.to_string(), SCHOLARSHIPS_XML.to_string());
        by_url.insert(TECH_URL.to_string(), TECH_XML.to_string());
        Self {
            by_url,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl FeedSource for FixtureFeeds {
    async fn fetch_items(&self, feed: &FeedSpec) -> anyhow::Result<Vec<FeedItem>> {
        self.calls.lock().unwrap().push(feed.url.clone());
        match self.by_url.get(&feed.url) {
            Some(xml) => parse_rss(xml),
            None => Err(anyhow!("connection refused: {}", feed.url)),
        }
    }
}

/// Records every send; chats in `failing` get an API error.
#[derive(Default)]
pub struct RecordingMessenger {
    pub failing: HashSet<ChatId>,
    pub sent: Mutex<Vec<(ChatId, OutgoingMessage)>>,
    pub sent_at: Mutex<Vec<tokio::time::Instant>>,
}

impl RecordingMessenger {
    pub fn failing_for(chats: &[&str]) -> Self {
        Self {
            failing: chats.iter().map(|c| ChatId::new(*c)).collect(),
            sent: Mutex::new(Vec::new()),
            sent_at: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_to(&self, chat: &str) -> Vec<OutgoingMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c.as_str() == chat)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat: &ChatId, msg: &OutgoingMessage) -> Result<(), TelegramError> {
        if self.failing.contains(chat) {
            return Err(TelegramError::Api("Bad Request: chat not found".into()));
        }
        self.sent.lock().unwrap().push((chat.clone(), msg.clone()));
        self.sent_at.lock().unwrap().push(tokio::time::Instant::now());
        Ok(())
    }
}

pub fn feed(name: &str, url: &str) -> FeedSpec {
    FeedSpec {
        name: name.to_string(),
        url: url.to_string(),
    }
}

pub fn standard_registry() -> SourceRegistry {
    SourceRegistry::new(vec![
        (
            Category::Scholarships,
            vec![feed("Opportunity Desk", SCHOLARSHIPS_URL)],
        ),
        (Category::Tech, vec![feed("RemoteOK", TECH_URL)]),
    ])
}

pub fn channels(ids: &[&str]) -> Vec<Destination> {
    ids.iter()
        .map(|id| Destination::new(ChatId::new(*id), format!("Channel {id}")))
        .collect()
}

pub struct Harness {
    pub feeds: Arc<FixtureFeeds>,
    pub messenger: Arc<RecordingMessenger>,
    pub state: Arc<BotState>,
    pub pipeline: Pipeline,
}

pub fn harness(
    registry: SourceRegistry,
    feeds: FixtureFeeds,
    messenger: RecordingMessenger,
    destinations: Vec<Destination>,
) -> Harness {
    let feeds = Arc::new(feeds);
    let messenger = Arc::new(messenger);
    let state = Arc::new(BotState::new(destinations));
    let pipeline = Pipeline::new(
        feeds.clone(),
        messenger.clone(),
        Arc::new(registry),
        state.clone(),
    )
    .with_pacing(Pacing::none());
    Harness {
        feeds,
        messenger,
        state,
        pipeline,
    }
}
