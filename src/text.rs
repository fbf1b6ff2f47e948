// src/text.rs
//! Text helpers shared by the fetcher and the formatter: tag stripping,
//! summaries, date labels and the stable opportunity identifier.

use once_cell::sync::OnceCell;
use regex::Regex;
use time::{format_description::well_known::Rfc2822, format_description::well_known::Rfc3339};
use time::{OffsetDateTime, UtcOffset};

pub const NO_DESCRIPTION: &str = "No description available.";
pub const RECENTLY_POSTED: &str = "Recently posted";
pub const ELLIPSIS: &str = "...";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap())
}

fn re_ws() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strip markup, decode entities, collapse whitespace runs and trim.
pub fn strip_and_normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let no_tags = re_tags().replace_all(raw, "");
    let decoded = html_escape::decode_html_entities(&no_tags);
    re_ws().replace_all(&decoded, " ").trim().to_string()
}

/// Cleaned text capped at `max_len` characters, with `...` appended when cut.
pub fn summarize(raw: &str, max_len: usize) -> String {
    let cleaned = strip_and_normalize(raw);
    if cleaned.is_empty() {
        return NO_DESCRIPTION.to_string();
    }
    if cleaned.chars().count() <= max_len {
        return cleaned;
    }
    let mut out: String = cleaned.chars().take(max_len).collect();
    out.push_str(ELLIPSIS);
    out
}

/// "Oct 5" style label (UTC). Never fails: unparseable input maps to a placeholder.
pub fn format_date_label(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_feed_date)
        .map(|dt| {
            let dt = dt.to_offset(UtcOffset::UTC);
            let month = MONTHS[usize::from(u8::from(dt.month())) - 1];
            format!("{} {}", month, dt.day())
        })
        .unwrap_or_else(|| RECENTLY_POSTED.to_string())
}

/// RSS dates are RFC 2822; some feeds ship RFC 3339 instead.
pub fn parse_feed_date(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(s, &Rfc3339))
        .ok()
}

/// 32-bit rolling hash (h * 31 + unit) over UTF-16 code units, rendered as
/// the base-36 magnitude. Stable across runs and platforms.
pub fn derive_identifier(seed: &str) -> String {
    let mut hash: i32 = 0;
    for unit in seed.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    to_base36(i64::from(hash).unsigned_abs())
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::with_capacity(8);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

/// Text placed inside a `*bold*` entity. Legacy Markdown ignores backslash
/// escapes there and cannot nest entities, so only the closing marker is
/// removed and everything else is left literal.
pub fn bold_safe(s: &str) -> String {
    s.replace('*', "")
}

/// Escape characters that legacy Telegram Markdown treats as entity markers.
/// Only valid outside an entity.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
