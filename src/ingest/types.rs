// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scholarships,
    Volunteer,
    Ngo,
    Tech,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Scholarships,
        Category::Volunteer,
        Category::Ngo,
        Category::Tech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Scholarships => "scholarships",
            Category::Volunteer => "volunteer",
            Category::Ngo => "ngo",
            Category::Tech => "tech",
        }
    }

    /// Header emoji used on posted opportunities.
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Scholarships => "🎓",
            Category::Volunteer => "🤝",
            Category::Ngo => "🏢",
            Category::Tech => "💻",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured feed: display name + URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
}

/// Raw item as parsed out of a feed, before cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    pub description: Option<String>,
    pub pub_date: Option<String>,
}

impl FeedItem {
    /// Permalink, falling back to the guid.
    pub fn permalink(&self) -> Option<&str> {
        self.link
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| self.guid.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    }
}

/// Normalized feed item eligible for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_label: String,
    pub source_name: String,
    pub category: Category,
}

/// Capability: given a feed, return its items in feed order.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_items(&self, feed: &FeedSpec) -> Result<Vec<FeedItem>>;
}
