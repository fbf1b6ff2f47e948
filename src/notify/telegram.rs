// src/notify/telegram.rs
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use super::{ChatId, Messenger, OutgoingMessage, ReplyMarkup};

const API_BASE: &str = "https://api.telegram.org";

/// Telegram API errors
#[derive(Debug, Error)]
pub enum TelegramError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Telegram API returned an error
    #[error("Telegram API error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

/// Telegram Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base: String,
}

impl TelegramClient {
    pub fn new(client: Client, bot_token: &str) -> Self {
        Self::with_base(client, API_BASE, bot_token)
    }

    /// Point the client at another Bot API host (local bot-api server, tests).
    pub fn with_base(client: Client, api_base: &str, bot_token: &str) -> Self {
        Self {
            client,
            base: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<T, TelegramError> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base, method))
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let parsed: ApiResponse<T> = resp.json().await?;
        if !parsed.ok {
            let desc = parsed
                .description
                .unwrap_or_else(|| format!("status {status}"));
            return Err(TelegramError::Api(desc));
        }
        parsed
            .result
            .ok_or_else(|| TelegramError::Api(format!("{method}: empty result")))
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        poll_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = json!({
            "offset": offset,
            "timeout": poll_secs,
            "allowed_updates": ["message"],
        });
        self.call("getUpdates", &body, Duration::from_secs(poll_secs + 10))
            .await
    }
}

pub(crate) fn message_body(chat: &ChatId, msg: &OutgoingMessage) -> Value {
    let mut body = json!({
        "chat_id": chat.as_str(),
        "text": msg.text,
        "disable_web_page_preview": false,
    });
    if msg.markdown {
        body["parse_mode"] = json!("Markdown");
    }
    match &msg.markup {
        Some(ReplyMarkup::Keyboard(rows)) => {
            let keyboard: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| row.iter().map(|label| json!({ "text": label })).collect())
                .collect();
            body["reply_markup"] = json!({
                "keyboard": keyboard,
                "resize_keyboard": true,
                "one_time_keyboard": false,
            });
        }
        Some(ReplyMarkup::RemoveKeyboard) => {
            body["reply_markup"] = json!({ "remove_keyboard": true });
        }
        None => {}
    }
    body
}

#[async_trait::async_trait]
impl Messenger for TelegramClient {
    async fn send(&self, chat: &ChatId, msg: &OutgoingMessage) -> Result<(), TelegramError> {
        let body = message_body(chat, msg);
        let _: Value = self
            .call("sendMessage", &body, Duration::from_secs(15))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_body_with_keyboard() {
        let msg = OutgoingMessage::markdown("*hi*").with_markup(ReplyMarkup::Keyboard(vec![
            vec!["A".into(), "B".into()],
            vec!["C".into()],
        ]));
        let b = message_body(&ChatId::new("@chan"), &msg);
        assert_eq!(b["chat_id"], "@chan");
        assert_eq!(b["parse_mode"], "Markdown");
        assert_eq!(b["reply_markup"]["keyboard"][0][1]["text"], "B");
        assert_eq!(b["reply_markup"]["resize_keyboard"], true);
    }

    #[test]
    fn plain_body_removes_keyboard() {
        let msg = OutgoingMessage::plain("bye").with_markup(ReplyMarkup::RemoveKeyboard);
        let b = message_body(&ChatId::from(7), &msg);
        assert_eq!(b["chat_id"], "7");
        assert!(b.get("parse_mode").is_none());
        assert_eq!(b["reply_markup"]["remove_keyboard"], true);
    }

    #[test]
    fn updates_deserialize() {
        let raw = r#"{"ok":true,"result":[{"update_id":10,"message":{"message_id":1,"chat":{"id":5,"type":"private"},"from":{"id":42,"is_bot":false,"first_name":"A"},"text":"/start"}},{"update_id":11}]}"#;
        let parsed: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let ups = parsed.result.unwrap();
        assert_eq!(ups.len(), 2);
        let m = ups[0].message.as_ref().unwrap();
        assert_eq!(m.from.as_ref().unwrap().id, 42);
        assert_eq!(m.text.as_deref(), Some("/start"));
        assert!(ups[1].message.is_none());
    }
}
