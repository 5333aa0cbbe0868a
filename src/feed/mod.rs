// src/feed/mod.rs
pub mod rss;
pub mod types;

pub use rss::RssFeed;
pub use types::{FeedSource, Post};

use once_cell::sync::OnceCell;
use regex::Regex;

/// Normalize feed text: decode entities, strip tags, unify quotes, collapse whitespace.
/// Punctuation is kept; `!` and capitals are scoring cues.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    // Block tags and <br> separate words; inline tags (<b>, <a>, <span>) vanish.
    static RE_BLOCK: OnceCell<Regex> = OnceCell::new();
    let re_block = RE_BLOCK.get_or_init(|| {
        Regex::new(r"(?is)</?(?:br|p|div|li|ul|ol|h[1-6]|tr|td|blockquote|hr)\b[^>]*>").unwrap()
    });
    out = re_block.replace_all(&out, " ").to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[a-z][^>]*>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{00A0}', " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // Length cap: 4000 chars (Telegram message limit is 4096)
    if out.chars().count() > 4000 {
        out = out.chars().take(4000).collect();
    }

    out
}
