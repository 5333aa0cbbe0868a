// src/feed/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use super::normalize_text;
use super::types::{FeedSource, Post};

pub const DEFAULT_FEED_URL: &str = "https://trumpstruth.org/feed";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    guid: Option<Guid>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// `<guid isPermaLink="false">…</guid>`; only the text matters.
#[derive(Debug, Deserialize)]
struct Guid {
    #[serde(rename = "$text", default)]
    value: String,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let unix = OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()?
        .unix_timestamp();
    Utc.timestamp_opt(unix, 0).single()
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// RSS 2.0 feed, fetched over HTTP or parsed from a fixture string.
pub struct RssFeed {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        url: String,
        client: reqwest::Client,
        timeout: Duration,
    },
}

impl RssFeed {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client: reqwest::Client::new(),
                timeout: Duration::from_secs(15),
            },
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    /// Request timeout for HTTP mode (`FEED_TIMEOUT_SECS`); ignored for fixtures.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        if let Mode::Http { timeout, .. } = &mut self.mode {
            *timeout = Duration::from_secs(secs.max(1));
        }
        self
    }

    /// Parse a feed document. `now` stands in for a missing or unparseable `pubDate`.
    pub fn parse_items(s: &str, limit: usize, now: DateTime<Utc>) -> Result<Vec<Post>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(limit));
        for it in rss.channel.item {
            if out.len() >= limit {
                break;
            }
            let link = non_empty(it.link);
            let id = non_empty(it.guid.map(|g| g.value)).or_else(|| link.clone());
            let Some(id) = id else {
                tracing::debug!(target: "feed", "item without guid or link skipped");
                continue;
            };

            let text = non_empty(it.description.map(|d| normalize_text(&d)))
                .or_else(|| non_empty(it.title.map(|t| normalize_text(&t))));
            let Some(text) = text else {
                tracing::debug!(target: "feed", %id, "item without text skipped");
                continue;
            };

            out.push(Post {
                url: link.unwrap_or_else(|| id.clone()),
                id,
                text,
                created_at: it
                    .pub_date
                    .as_deref()
                    .and_then(parse_rfc2822)
                    .unwrap_or(now),
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("feed_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl FeedSource for RssFeed {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<Post>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items(s, limit, Utc::now()),
            Mode::Http {
                url,
                client,
                timeout,
            } => {
                let resp = client
                    .get(url)
                    .timeout(*timeout)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?;
                let status = resp.status();
                if !status.is_success() {
                    anyhow::bail!("GET {url} returned {status}");
                }
                let body = resp.text().await.context("reading feed body")?;
                Self::parse_items(&body, limit, Utc::now())
            }
        }
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}

/// HTML named entities are not valid XML; replace the common ones before parsing.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
