// src/notify/mod.rs
pub mod delivery;
pub mod telegram;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use delivery::{deliver, DeliveryReport};
pub use telegram::{TelegramClient, TelegramError};

/// Telegram chat target: `@channel`, `-100...` or a numeric private chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Persistent reply keyboard, rows of button labels.
    Keyboard(Vec<Vec<String>>),
    RemoveKeyboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub markdown: bool,
    pub markup: Option<ReplyMarkup>,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            markup: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
            markup: None,
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = Some(markup);
        self
    }
}

/// Capability: deliver one message to one chat.
#[async_trait::async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat: &ChatId, msg: &OutgoingMessage) -> Result<(), TelegramError>;
}
