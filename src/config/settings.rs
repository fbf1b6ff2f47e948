// src/config/settings.rs
use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt;
use std::time::Duration;

use crate::control::UserId;
use crate::ingest::FetchLimits;
use crate::notify::ChatId;

pub const BOT_NAME: &str = "Opportunities4Africa";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SCAN_INTERVAL_SECS: u64 = 30 * 60;
const DEFAULT_SELF_PING_INTERVAL_SECS: u64 = 14 * 60;
const DEFAULT_SEND_DELAY_MS: u64 = 3_000;
const DEFAULT_ITEM_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    Development,
    /// Always-on hosting: background scans (and self-ping when a URL is known).
    Production,
}

impl DeployMode {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => DeployMode::Production,
            _ => DeployMode::Development,
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMode::Development => f.write_str("Development"),
            DeployMode::Production => f.write_str("Production"),
        }
    }
}

/// Throttling between outbound sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between consecutive sends to different destinations.
    pub send_delay: Duration,
    /// Between consecutive opportunities within a scan.
    pub item_delay: Duration,
}

impl Pacing {
    pub const fn none() -> Self {
        Self {
            send_delay: Duration::ZERO,
            item_delay: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            send_delay: Duration::from_millis(DEFAULT_SEND_DELAY_MS),
            item_delay: Duration::from_millis(DEFAULT_ITEM_DELAY_MS),
        }
    }
}

#[derive(Clone)]
pub struct Settings {
    pub bot_token: String,
    pub primary_channel: ChatId,
    pub extra_channels: Vec<ChatId>,
    pub admin: UserId,
    pub mode: DeployMode,
    pub public_url: Option<String>,
    pub port: u16,
    pub scan_interval: Duration,
    pub self_ping_interval: Duration,
    pub pacing: Pacing,
    pub fetch: FetchLimits,
}

// Keeps the token out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bot_token", &"<redacted>")
            .field("primary_channel", &self.primary_channel)
            .field("extra_channels", &self.extra_channels)
            .field("admin", &self.admin)
            .field("mode", &self.mode)
            .field("public_url", &self.public_url)
            .field("port", &self.port)
            .field("scan_interval", &self.scan_interval)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from any key lookup (env in prod, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN").ok_or_else(|| anyhow!("BOT_TOKEN is required"))?;
        let channel = var("CHANNEL_ID").ok_or_else(|| anyhow!("CHANNEL_ID is required"))?;
        let admin_raw =
            var("ADMIN_USER_ID").ok_or_else(|| anyhow!("ADMIN_USER_ID is required"))?;
        let admin = admin_raw
            .parse::<i64>()
            .map(UserId)
            .with_context(|| format!("ADMIN_USER_ID must be numeric, got {admin_raw:?}"))?;

        if !re_token().is_match(&bot_token) {
            tracing::warn!("BOT_TOKEN does not look like <digits>:<secret>");
        }
        if !is_valid_channel(&channel) {
            tracing::warn!(channel = %channel, "CHANNEL_ID should be @name or -100...");
        }

        let extra_channels = var("EXTRA_CHANNEL_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty() && *s != channel)
                    .map(ChatId::new)
                    .collect()
            })
            .unwrap_or_default();

        let mode = DeployMode::parse(var("NODE_ENV").or_else(|| var("APP_ENV")).as_deref());
        let public_url = var("RENDER_URL").map(|u| u.trim_end_matches('/').to_string());
        if let Some(u) = &public_url {
            if !u.starts_with("http://") && !u.starts_with("https://") {
                bail!("RENDER_URL must start with http:// or https://");
            }
        }

        let port = parse_or(var("PORT"), "PORT", DEFAULT_PORT)?;
        let scan_secs = parse_or(
            var("SCAN_INTERVAL_SECS"),
            "SCAN_INTERVAL_SECS",
            DEFAULT_SCAN_INTERVAL_SECS,
        )?;
        if scan_secs == 0 {
            bail!("SCAN_INTERVAL_SECS must be > 0");
        }
        let ping_secs = parse_or(
            var("SELF_PING_INTERVAL_SECS"),
            "SELF_PING_INTERVAL_SECS",
            DEFAULT_SELF_PING_INTERVAL_SECS,
        )?
        .max(1);
        let send_ms = parse_or(var("SEND_DELAY_MS"), "SEND_DELAY_MS", DEFAULT_SEND_DELAY_MS)?;
        let item_ms = parse_or(var("ITEM_DELAY_MS"), "ITEM_DELAY_MS", DEFAULT_ITEM_DELAY_MS)?;
        let defaults = FetchLimits::default();
        let timeout_secs = parse_or(
            var("FEED_TIMEOUT_SECS"),
            "FEED_TIMEOUT_SECS",
            defaults.timeout.as_secs(),
        )?
        .max(1);
        let items_per_feed = parse_or(
            var("ITEMS_PER_FEED"),
            "ITEMS_PER_FEED",
            defaults.items_per_feed,
        )?;

        Ok(Self {
            bot_token,
            primary_channel: ChatId::new(channel),
            extra_channels,
            admin,
            mode,
            public_url,
            port,
            scan_interval: Duration::from_secs(scan_secs),
            self_ping_interval: Duration::from_secs(ping_secs),
            pacing: Pacing {
                send_delay: Duration::from_millis(send_ms),
                item_delay: Duration::from_millis(item_ms),
            },
            fetch: FetchLimits {
                items_per_feed,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }

    /// Background scans run only in always-on mode.
    pub fn auto_scan_enabled(&self) -> bool {
        self.mode == DeployMode::Production
    }

    pub fn self_ping_enabled(&self) -> bool {
        self.auto_scan_enabled() && self.public_url.is_some()
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse::<T>()
            .map_err(|_| anyhow!("{key} has an invalid value: {v:?}")),
    }
}

fn re_token() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^\d+:[A-Za-z0-9_-]+$").unwrap())
}

fn is_valid_channel(s: &str) -> bool {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^@[A-Za-z0-9_]+$|^-\d+$").unwrap())
        .is_match(s)
}
