// src/notify/format.rs
use crate::classify::ClassificationResult;
use crate::impact::impact_level;

pub const DEFAULT_BANNER: &str = "🍊 iTrump";
const NO_TAGS: &str = "—";

/// Plain-text alert:
///
/// ```text
/// 🍊 iTrump | 🚨 Market Impact: HIGH (0.78) | Sentiment: 🔴📉 Bearish (0.81)
/// 📎 Tags: Trade, Geopolitics
///
/// <post text>
///
/// Link: <url>
/// ```
pub fn format_alert(banner: &str, url: &str, text: &str, meta: &ClassificationResult) -> String {
    let (impact_emoji, impact_label) = impact_level(meta.impact_score);
    let tags = if meta.tags.is_empty() {
        NO_TAGS.to_string()
    } else {
        meta.tags.join(", ")
    };

    format!(
        "{banner} | {impact_emoji} Market Impact: {impact_label} ({:.2}) | Sentiment: {} {} ({:.2})\n📎 Tags: {tags}\n\n{}\n\nLink: {url}",
        meta.impact_score,
        meta.sentiment.emoji(),
        meta.sentiment,
        meta.sentiment_confidence,
        text.trim(),
    )
}
