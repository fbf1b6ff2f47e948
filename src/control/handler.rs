// src/control/handler.rs
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use super::{admin_keyboard, is_admin, Command, UserId};
use crate::config::{DeployMode, SourceRegistry};
use crate::ingest::types::Category;
use crate::notify::{ChatId, Messenger, OutgoingMessage, ReplyMarkup};
use crate::pipeline::{Pipeline, ScanOutcome, ScanReport};
use crate::state::{BotState, Destination, OperationalState, Stats};
use crate::text::escape_markdown;

pub const PUBLIC_START_REPLY: &str = "This bot posts to channels automatically.";
pub const PAUSED_REFUSAL: &str = "⚠️ Bot is paused. Resume it first.";
pub const SCAN_STARTED: &str = "🔍 Starting scan... Please wait.";
pub const SCAN_BUSY: &str = "⏳ A scan is already running. Try again when it finishes.";
pub const SCAN_WITH_ERRORS: &str = "⚠️ Scan completed with some errors. Check logs.";
pub const GENERIC_ERROR_REPLY: &str = "⚠️ An error occurred. Please try again.";

/// A text message as received from the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat: ChatId,
    pub sender: Option<UserId>,
    pub text: String,
}

/// Read-only facts shown by the settings screen.
#[derive(Debug, Clone)]
pub struct ControllerInfo {
    pub mode: DeployMode,
    pub primary_channel: ChatId,
    pub auto_scan: bool,
    pub scan_interval: Duration,
}

#[derive(Clone)]
pub struct Controller {
    pipeline: Pipeline,
    messenger: Arc<dyn Messenger>,
    admin: UserId,
    info: ControllerInfo,
}

impl Controller {
    pub fn new(
        pipeline: Pipeline,
        messenger: Arc<dyn Messenger>,
        admin: UserId,
        info: ControllerInfo,
    ) -> Self {
        Self {
            pipeline,
            messenger,
            admin,
            info,
        }
    }

    fn state(&self) -> &BotState {
        self.pipeline.state()
    }

    async fn reply(&self, chat: &ChatId, msg: OutgoingMessage) -> Result<()> {
        self.messenger
            .send(chat, &msg)
            .await
            .with_context(|| format!("replying to chat {chat}"))
    }

    /// Dispatch one message. Non-admins get at most the public `/start` reply.
    pub async fn handle(&self, msg: &IncomingMessage) -> Result<()> {
        let Some(cmd) = Command::parse(&msg.text) else {
            return Ok(());
        };

        if !is_admin(msg.sender, self.admin) {
            tracing::debug!(?cmd, sender = ?msg.sender, "ignoring non-admin command");
            if cmd == Command::Start {
                self.reply(&msg.chat, OutgoingMessage::plain(PUBLIC_START_REPLY))
                    .await?;
            }
            return Ok(());
        }

        tracing::info!(?cmd, "admin command");
        match cmd {
            Command::Start => {
                let text = render_welcome(&self.state().operational(), self.state().total_posted());
                let out = OutgoingMessage::markdown(text)
                    .with_markup(ReplyMarkup::Keyboard(admin_keyboard()));
                self.reply(&msg.chat, out).await
            }
            Command::Dashboard => {
                let text = render_dashboard(
                    &self.state().stats(),
                    &self.state().operational(),
                    &self.state().destinations(),
                );
                self.reply(&msg.chat, OutgoingMessage::markdown(text)).await
            }
            Command::ScanNow => self.scan_now(&msg.chat).await,
            Command::Pause => {
                self.state().pause();
                self.reply(
                    &msg.chat,
                    OutgoingMessage::plain("⏸️ Bot paused. Press [▶️ Resume Bot] to continue."),
                )
                .await
            }
            Command::Resume => {
                self.state().resume();
                self.reply(&msg.chat, OutgoingMessage::plain("▶️ Bot resumed!"))
                    .await
            }
            Command::Sources => {
                let text = render_sources(self.pipeline.registry());
                self.reply(&msg.chat, OutgoingMessage::markdown(text)).await
            }
            Command::Settings => {
                let text = render_settings(&self.info, &self.state().destinations());
                self.reply(&msg.chat, OutgoingMessage::markdown(text)).await
            }
            Command::Close => {
                let out = OutgoingMessage::plain("Menu closed.")
                    .with_markup(ReplyMarkup::RemoveKeyboard);
                self.reply(&msg.chat, out).await
            }
        }
    }

    async fn scan_now(&self, chat: &ChatId) -> Result<()> {
        if self.state().is_paused() {
            return self.reply(chat, OutgoingMessage::plain(PAUSED_REFUSAL)).await;
        }
        self.reply(chat, OutgoingMessage::plain(SCAN_STARTED)).await?;

        // Own task, so a panic inside the scan ends up here as a JoinError.
        let pipeline = self.pipeline.clone();
        let joined = tokio::spawn(async move { pipeline.run_scan().await }).await;
        let text = match joined {
            Ok(ScanOutcome::Completed(report)) => render_scan_done(&report),
            Ok(ScanOutcome::AlreadyRunning) => SCAN_BUSY.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "on-demand scan aborted");
                SCAN_WITH_ERRORS.to_string()
            }
        };
        self.reply(chat, OutgoingMessage::plain(text)).await
    }

    /// Last-resort error path: log, then try to tell the user. A failed
    /// notification is swallowed.
    pub async fn report_failure(&self, msg: &IncomingMessage, err: &anyhow::Error) {
        tracing::error!(error = ?err, chat = %msg.chat, "command handler failed");
        if let Err(e) = self
            .messenger
            .send(&msg.chat, &OutgoingMessage::plain(GENERIC_ERROR_REPLY))
            .await
        {
            tracing::debug!(error = %e, "error notification not delivered");
        }
    }
}

fn status_label(ops: &OperationalState) -> &'static str {
    if ops.paused {
        "⏸️ Paused"
    } else {
        "✅ Active"
    }
}

pub fn render_welcome(ops: &OperationalState, total_posted: u64) -> String {
    format!(
        "🤖 *Opportunities4Africa Bot*\n\n\
         Welcome, Admin!\n\n\
         Status: {}\n\
         Posts Today: {}\n\n\
         Use buttons below to control the bot.",
        status_label(ops),
        total_posted
    )
}

pub fn render_dashboard(stats: &Stats, ops: &OperationalState, dests: &[Destination]) -> String {
    let last_scan = stats
        .last_scan
        .map(|t| t.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Not yet".to_string());
    let mut out = format!(
        "📊 *Dashboard*\n\n\
         Status: {}\n\
         Total Posts: {}\n\
         Last Scan: {}\n\
         Scans Today: {}\n",
        status_label(ops),
        stats.total_posted,
        last_scan,
        stats.scans_today,
    );
    if let (true, Some(at)) = (ops.paused, ops.paused_at) {
        let _ = writeln!(out, "Paused Since: {}", at.format("%b %-d %H:%M UTC"));
    }
    let _ = write!(
        out,
        "\n*Breakdown:*\n\
         📚 Scholarships: {}\n\
         🤝 Volunteer: {}\n\
         🏢 NGO: {}\n\
         💻 Tech: {}\n",
        stats.posted_in(Category::Scholarships),
        stats.posted_in(Category::Volunteer),
        stats.posted_in(Category::Ngo),
        stats.posted_in(Category::Tech),
    );
    let _ = write!(out, "\n*Channels:*\n");
    for d in dests {
        let _ = writeln!(
            out,
            "{} {}: {} posts",
            if d.active { "🟢" } else { "⚪" },
            escape_markdown(&d.display_name),
            d.total_posts_sent
        );
    }
    out
}

pub fn render_sources(registry: &SourceRegistry) -> String {
    let mut out = String::from("📚 *Monitored Sources*\n\n");
    for (category, feeds) in registry.categories() {
        let _ = writeln!(out, "*{}*", category.as_str().to_uppercase());
        for (i, feed) in feeds.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, escape_markdown(&feed.name));
        }
        out.push('\n');
    }
    out
}

pub fn render_settings(info: &ControllerInfo, dests: &[Destination]) -> String {
    let active = dests.iter().filter(|d| d.active).count();
    format!(
        "⚙️ *Settings*\n\n\
         Mode: {}\n\
         Channel: {}\n\
         Auto-scan: {}\n\
         Scan Interval: {} min\n\
         Destinations: {} active / {} total",
        info.mode,
        escape_markdown(info.primary_channel.as_str()),
        if info.auto_scan { "Enabled" } else { "Disabled" },
        info.scan_interval.as_secs() / 60,
        active,
        dests.len(),
    )
}

pub fn render_scan_done(report: &ScanReport) -> String {
    let mut out = format!(
        "✅ Scan complete! Posted {} total opportunities ({} new).",
        report.total_posted, report.posted
    );
    if !report.failed_sources.is_empty() {
        let _ = write!(
            out,
            "\n⚠️ Skipped sources: {}",
            report.failed_sources.join(", ")
        );
    }
    out
}
