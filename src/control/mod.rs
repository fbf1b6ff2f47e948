// src/control/mod.rs
//! Admin chat surface: command parsing, identity gate, handlers and the
//! Telegram long-poll loop.

pub mod handler;
pub mod poller;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use handler::{Controller, ControllerInfo, IncomingMessage};
pub use poller::spawn_update_poller;

/// Telegram user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strict numeric identity check; a missing sender never matches.
pub fn is_admin(sender: Option<UserId>, admin: UserId) -> bool {
    sender == Some(admin)
}

pub const BTN_DASHBOARD: &str = "📊 Dashboard";
pub const BTN_SCAN_NOW: &str = "🔍 Scan Now";
pub const BTN_PAUSE: &str = "⏸️ Pause Bot";
pub const BTN_RESUME: &str = "▶️ Resume Bot";
pub const BTN_SOURCES: &str = "📚 Sources";
pub const BTN_SETTINGS: &str = "⚙️ Settings";
pub const BTN_CLOSE: &str = "❌ Close Menu";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Dashboard,
    ScanNow,
    Pause,
    Resume,
    Sources,
    Settings,
    Close,
}

impl Command {
    /// Map message text to a command. `/start` accepts `@botname` and a payload.
    pub fn parse(text: &str) -> Option<Self> {
        let t = text.trim();
        let first = t.split_whitespace().next().unwrap_or_default();
        let bare = first.split('@').next().unwrap_or_default();
        if bare.eq_ignore_ascii_case("/start") {
            return Some(Command::Start);
        }
        match t {
            BTN_DASHBOARD => Some(Command::Dashboard),
            BTN_SCAN_NOW => Some(Command::ScanNow),
            BTN_PAUSE => Some(Command::Pause),
            BTN_RESUME => Some(Command::Resume),
            BTN_SOURCES => Some(Command::Sources),
            BTN_SETTINGS => Some(Command::Settings),
            BTN_CLOSE => Some(Command::Close),
            _ => None,
        }
    }
}

/// Admin reply keyboard, two buttons per row.
pub fn admin_keyboard() -> Vec<Vec<String>> {
    [
        &[BTN_DASHBOARD, BTN_SCAN_NOW][..],
        &[BTN_PAUSE, BTN_RESUME][..],
        &[BTN_SOURCES, BTN_SETTINGS][..],
        &[BTN_CLOSE][..],
    ]
    .iter()
    .map(|row| row.iter().map(|s| s.to_string()).collect())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_variants_and_buttons() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/start@OppsBot"), Some(Command::Start));
        assert_eq!(Command::parse(" /start ref123"), Some(Command::Start));
        assert_eq!(Command::parse("📊 Dashboard"), Some(Command::Dashboard));
        assert_eq!(Command::parse("🔍 Scan Now"), Some(Command::ScanNow));
        assert_eq!(Command::parse("⏸️ Pause Bot"), Some(Command::Pause));
        assert_eq!(Command::parse("▶️ Resume Bot"), Some(Command::Resume));
        assert_eq!(Command::parse("📚 Sources"), Some(Command::Sources));
        assert_eq!(Command::parse("⚙️ Settings"), Some(Command::Settings));
        assert_eq!(Command::parse("❌ Close Menu"), Some(Command::Close));
        assert_eq!(Command::parse("Dashboard"), None);
        assert_eq!(Command::parse("/started"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn admin_check_is_strict() {
        let admin = UserId(123456789);
        assert!(is_admin(Some(UserId(123456789)), admin));
        assert!(!is_admin(Some(UserId(12345678)), admin));
        assert!(!is_admin(Some(UserId(-123456789)), admin));
        assert!(!is_admin(None, admin));
    }

    #[test]
    fn keyboard_has_every_button_once() {
        let flat: Vec<String> = admin_keyboard().into_iter().flatten().collect();
        assert_eq!(flat.len(), 7);
        for label in flat {
            assert!(Command::parse(&label).is_some(), "{label}");
        }
    }
}
