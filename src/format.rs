// src/format.rs
//! Channel post rendering (legacy Telegram Markdown).

use crate::ingest::types::Opportunity;
use crate::text::{bold_safe, escape_markdown, summarize};

pub const HEADER: &str = "🌍 *Opportunities4Africa* 🌍\n━━━━━━━━━━━━━━━━━━━━\n\n";
pub const FOOTER: &str = "\n\n━━━━━━━━━━━━━━━━━━━━\n⚡ *Powered by Almuk* ⚡";

pub const SUMMARY_LEN: usize = 200;

pub fn format_opportunity(opp: &Opportunity) -> String {
    format!(
        "{emoji} *{category} OPPORTUNITY*\n\n\
         *{title}*\n\n\
         {summary}\n\n\
         📅 {date}\n\
         🔗 [Apply Here]({link})\n\n\
         📌 Source: {source}",
        emoji = opp.category.emoji(),
        category = opp.category.as_str().to_uppercase(),
        title = bold_safe(&opp.title),
        summary = escape_markdown(&summarize(&opp.description, SUMMARY_LEN)),
        date = opp.published_label,
        link = opp.link,
        source = escape_markdown(&opp.source_name),
    )
}

pub fn with_branding(content: &str) -> String {
    format!("{HEADER}{content}{FOOTER}")
}
