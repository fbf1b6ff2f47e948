// src/config/sources.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::{Category, FeedSpec};

pub const ENV_SOURCES_PATH: &str = "SOURCES_PATH";

/// Category -> ordered feeds. Categories keep their configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRegistry {
    categories: Vec<(Category, Vec<FeedSpec>)>,
}

impl SourceRegistry {
    pub fn new(categories: Vec<(Category, Vec<FeedSpec>)>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[(Category, Vec<FeedSpec>)] {
        &self.categories
    }

    pub fn feed_count(&self) -> usize {
        self.categories.iter().map(|(_, f)| f.len()).sum()
    }

    /// Reference table the bot ships with.
    pub fn builtin() -> Self {
        fn feed(name: &str, url: &str) -> FeedSpec {
            FeedSpec {
                name: name.to_string(),
                url: url.to_string(),
            }
        }
        Self::new(vec![
            (
                Category::Scholarships,
                vec![
                    feed("Opportunity Desk", "https://opportunitydesk.org/feed/"),
                    feed(
                        "Opportunities for Africans",
                        "https://www.opportunitiesforafricans.com/feed/",
                    ),
                ],
            ),
            (
                Category::Volunteer,
                vec![feed("Go Volunteer Africa", "https://govolunteerafrica.org/feed/")],
            ),
            (
                Category::Ngo,
                vec![feed("ReliefWeb RSS", "https://reliefweb.int/updates/rss.xml")],
            ),
            (
                Category::Tech,
                vec![feed("RemoteOK", "https://remoteok.com/remote-dev-jobs.rss")],
            ),
        ])
    }
}

/// Load a registry from an explicit path. Supports TOML or JSON formats.
pub fn load_sources_from(path: &Path) -> Result<SourceRegistry> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => parse_json(&content),
        _ => parse_toml(&content),
    }
}

/// Load the registry using env var + fallbacks:
/// 1) $SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in table
pub fn load_sources_default() -> Result<SourceRegistry> {
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        }
        return Err(anyhow!("SOURCES_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(SourceRegistry::builtin())
}

#[derive(Deserialize)]
struct CategoryEntry {
    category: Category,
    #[serde(default)]
    feeds: Vec<FeedSpec>,
}

fn parse_toml(s: &str) -> Result<SourceRegistry> {
    #[derive(Deserialize)]
    struct TomlSources {
        #[serde(rename = "category", default)]
        categories: Vec<CategoryEntry>,
    }
    let v: TomlSources = toml::from_str(s).context("parsing sources toml")?;
    build(v.categories)
}

fn parse_json(s: &str) -> Result<SourceRegistry> {
    let v: Vec<CategoryEntry> = serde_json::from_str(s).context("parsing sources json")?;
    build(v)
}

fn build(entries: Vec<CategoryEntry>) -> Result<SourceRegistry> {
    let mut out: Vec<(Category, Vec<FeedSpec>)> = Vec::new();
    for entry in entries {
        let feeds: Vec<FeedSpec> = entry
            .feeds
            .into_iter()
            .map(|f| FeedSpec {
                name: f.name.trim().to_string(),
                url: f.url.trim().to_string(),
            })
            .filter(|f| !f.url.is_empty())
            .collect();
        // A repeated category extends the earlier block.
        match out.iter_mut().find(|(c, _)| *c == entry.category) {
            Some((_, existing)) => existing.extend(feeds),
            None => out.push((entry.category, feeds)),
        }
    }
    if out.iter().all(|(_, f)| f.is_empty()) {
        return Err(anyhow!("source registry has no feeds"));
    }
    Ok(SourceRegistry::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn builtin_has_four_categories_in_order() {
        let r = SourceRegistry::builtin();
        let cats: Vec<_> = r.categories().iter().map(|(c, _)| *c).collect();
        assert_eq!(cats, Category::ALL.to_vec());
        assert_eq!(r.feed_count(), 5);
    }

    #[test]
    fn toml_keeps_order_and_merges_repeats() {
        let toml = r#"
[[category]]
category = "tech"
feeds = [{ name = " RemoteOK ", url = "https://remoteok.com/remote-dev-jobs.rss" }]

[[category]]
category = "ngo"
feeds = [{ name = "ReliefWeb", url = "https://reliefweb.int/updates/rss.xml" }]

[[category]]
category = "tech"
feeds = [{ name = "Empty", url = "  " }, { name = "Other", url = "https://jobs.example/rss" }]
"#;
        let r = parse_toml(toml).unwrap();
        assert_eq!(r.categories().len(), 2);
        assert_eq!(r.categories()[0].0, Category::Tech);
        assert_eq!(r.categories()[0].1.len(), 2);
        assert_eq!(r.categories()[0].1[0].name, "RemoteOK");
        assert_eq!(r.categories()[1].0, Category::Ngo);
    }

    #[test]
    fn json_and_empty_registry() {
        let json = r#"[{"category":"volunteer","feeds":[{"name":"GVA","url":"https://gva.example/feed"}]}]"#;
        let r = parse_json(json).unwrap();
        assert_eq!(r.feed_count(), 1);
        assert!(parse_json(r#"[{"category":"tech"}]"#).is_err());
        assert!(parse_json(r#"[{"category":"sports","feeds":[]}]"#).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_SOURCES_PATH);

        // Nothing on disk -> built-in table
        assert_eq!(load_sources_default().unwrap(), SourceRegistry::builtin());

        let p_json = tmp.path().join("sources.json");
        fs::write(
            &p_json,
            r#"[{"category":"tech","feeds":[{"name":"X","url":"https://x.example/rss"}]}]"#,
        )
        .unwrap();
        env::set_var(ENV_SOURCES_PATH, p_json.display().to_string());
        let r = load_sources_default().unwrap();
        assert_eq!(r.feed_count(), 1);

        env::set_var(ENV_SOURCES_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_sources_default().is_err());
        env::remove_var(ENV_SOURCES_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
