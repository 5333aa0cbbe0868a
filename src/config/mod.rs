// src/config/mod.rs
//! Process configuration, read once from the environment (after `.env`).

use chrono::Duration;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::dedup::DEFAULT_SEEN_STATE_PATH;
use crate::feed::rss::DEFAULT_FEED_URL;
use crate::notify::format::DEFAULT_BANNER;
use crate::policy::AlertPolicy;

/// Longest accepted cooldown: 30 days.
const MAX_DEDUP_WINDOW_MIN: i64 = 30 * 24 * 60;
const MAX_DEDUP_RETENTION_FACTOR: i64 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub policy: AlertPolicy,
    pub dedup_window_min: i64,
    pub dedup_retention_factor: i64,
    pub seen_state_path: PathBuf,
    pub lexicon_path: Option<PathBuf>,
    pub feed_url: String,
    pub feed_limit: usize,
    pub feed_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub delivery_timeout_secs: u64,
    pub alert_banner: String,
    pub dry_run: bool,
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            policy: AlertPolicy::default(),
            dedup_window_min: 60,
            dedup_retention_factor: 24,
            seen_state_path: PathBuf::from(DEFAULT_SEEN_STATE_PATH),
            lexicon_path: None,
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_limit: 10,
            feed_timeout_secs: 15,
            poll_interval_secs: 30,
            telegram_token: None,
            telegram_chat_id: None,
            delivery_timeout_secs: 10,
            alert_banner: DEFAULT_BANNER.to_string(),
            dry_run: false,
            metrics_addr: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Invalid values fall back to defaults with a warning.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let policy = AlertPolicy {
            impact_threshold: unit_or(&get, "IMPACT_THRESHOLD", d.policy.impact_threshold),
            finance_only: bool_or(&get, "FINANCE_ONLY", d.policy.finance_only),
            crypto_only: bool_or(&get, "CRYPTO_ONLY", d.policy.crypto_only),
            require_non_neutral: bool_or(&get, "REQUIRE_NON_NEUTRAL", d.policy.require_non_neutral),
            min_sentiment_confidence: unit_or(
                &get,
                "MIN_SENT_CONF",
                d.policy.min_sentiment_confidence,
            ),
            neutral_override_impact: unit_or(
                &get,
                "NEUTRAL_OVERRIDE_IMPACT",
                d.policy.neutral_override_impact,
            ),
        };

        Self {
            policy,
            dedup_window_min: parsed_or(&get, "DEDUP_WINDOW_MIN", d.dedup_window_min)
                .clamp(0, MAX_DEDUP_WINDOW_MIN),
            dedup_retention_factor: parsed_or(
                &get,
                "DEDUP_RETENTION_FACTOR",
                d.dedup_retention_factor,
            )
            .clamp(1, MAX_DEDUP_RETENTION_FACTOR),
            seen_state_path: get("SEEN_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or(d.seen_state_path),
            lexicon_path: get(crate::lexicon::ENV_LEXICON_PATH).map(PathBuf::from),
            feed_url: get("FEED_URL").unwrap_or(d.feed_url),
            feed_limit: parsed_or(&get, "FEED_LIMIT", d.feed_limit).max(1),
            feed_timeout_secs: parsed_or(&get, "FEED_TIMEOUT_SECS", d.feed_timeout_secs).max(1),
            poll_interval_secs: parsed_or(&get, "POLL_INTERVAL_SECS", d.poll_interval_secs).max(1),
            telegram_token: get("TELEGRAM_TOKEN"),
            telegram_chat_id: get("TELEGRAM_CHAT_ID"),
            delivery_timeout_secs: parsed_or(
                &get,
                "DELIVERY_TIMEOUT_SECS",
                d.delivery_timeout_secs,
            )
            .max(1),
            alert_banner: get("ALERT_BANNER").unwrap_or(d.alert_banner),
            dry_run: bool_or(&get, "DRY_RUN", d.dry_run),
            metrics_addr: get("METRICS_ADDR").and_then(|v| match v.parse() {
                Ok(a) => Some(a),
                Err(_) => {
                    tracing::warn!("METRICS_ADDR={v:?} is not a socket address; exporter disabled");
                    None
                }
            }),
        }
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::minutes(self.dedup_window_min)
    }

    pub fn dedup_retention(&self) -> Duration {
        Duration::minutes(self.dedup_window_min.saturating_mul(self.dedup_retention_factor))
    }

    /// Telegram credentials, unless dry-run or either one is missing.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        if self.dry_run {
            return None;
        }
        match (&self.telegram_token, &self.telegram_chat_id) {
            (Some(t), Some(c)) => Some((t.as_str(), c.as_str())),
            _ => None,
        }
    }
}

/// Parse a float and clamp to [0, 1]; fall back to `default` if invalid.
fn unit_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: f32) -> f32 {
    match get(key) {
        None => default,
        Some(v) => match v.parse::<f32>() {
            Ok(x) if x.is_finite() => x.clamp(0.0, 1.0),
            _ => {
                tracing::warn!("{key}={v:?} is not a number; using {default}");
                default
            }
        },
    }
}

fn bool_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match get(key) {
        None => default,
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!("{key}={v:?} is not a boolean; using {default}");
                default
            }
        },
    }
}

fn parsed_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match get(key) {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!("{key}={v:?} is invalid; using {default}");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let c = cfg(&[]);
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.policy.impact_threshold, 0.60);
        assert!(c.policy.finance_only);
        assert_eq!(c.dedup_window(), Duration::minutes(60));
        assert_eq!(c.dedup_retention(), Duration::hours(24));
        assert!(c.telegram().is_none());
    }

    #[test]
    fn floats_are_clamped_and_bad_values_fall_back() {
        let c = cfg(&[
            ("IMPACT_THRESHOLD", "1.7"),
            ("MIN_SENT_CONF", "-3"),
            ("NEUTRAL_OVERRIDE_IMPACT", "lots"),
        ]);
        assert_eq!(c.policy.impact_threshold, 1.0);
        assert_eq!(c.policy.min_sentiment_confidence, 0.0);
        assert_eq!(c.policy.neutral_override_impact, 0.90);
    }

    #[test]
    fn booleans_accept_common_spellings() {
        let c = cfg(&[
            ("FINANCE_ONLY", "off"),
            ("CRYPTO_ONLY", "YES"),
            ("REQUIRE_NON_NEUTRAL", "0"),
            ("DRY_RUN", "maybe"),
        ]);
        assert!(!c.policy.finance_only);
        assert!(c.policy.crypto_only);
        assert!(!c.policy.require_non_neutral);
        assert!(!c.dry_run);
    }

    #[test]
    fn telegram_needs_both_credentials_and_no_dry_run() {
        let c = cfg(&[("TELEGRAM_TOKEN", "123:abc")]);
        assert!(c.telegram().is_none());

        let c = cfg(&[("TELEGRAM_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "-42")]);
        assert_eq!(c.telegram(), Some(("123:abc", "-42")));

        let c = cfg(&[
            ("TELEGRAM_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-42"),
            ("DRY_RUN", "1"),
        ]);
        assert!(c.telegram().is_none());
    }

    #[test]
    fn huge_dedup_window_is_clamped() {
        let c = cfg(&[
            ("DEDUP_WINDOW_MIN", "100000000000"),
            ("DEDUP_RETENTION_FACTOR", "99999"),
        ]);
        assert_eq!(c.dedup_window_min, MAX_DEDUP_WINDOW_MIN);
        assert_eq!(c.dedup_retention_factor, MAX_DEDUP_RETENTION_FACTOR);
        assert_eq!(c.dedup_window(), Duration::days(30));
        assert_eq!(c.dedup_retention(), Duration::days(30 * 365));

        // the store opens with these durations without overflowing
        let dir = tempfile::tempdir().unwrap();
        let store = crate::dedup::FileSeenStore::open(
            dir.path().join("seen.json"),
            c.dedup_window(),
            c.dedup_retention(),
        );
        assert!(crate::dedup::SeenStore::is_empty(&store));
    }

    #[test]
    fn numeric_floors_and_misc() {
        let c = cfg(&[
            ("FEED_LIMIT", "0"),
            ("POLL_INTERVAL_SECS", "x"),
            ("DEDUP_WINDOW_MIN", "15"),
            ("DEDUP_RETENTION_FACTOR", "4"),
            ("METRICS_ADDR", "127.0.0.1:9100"),
            ("FEED_TIMEOUT_SECS", "0"),
            ("SEEN_STATE_PATH", " /tmp/seen.json "),
        ]);
        assert_eq!(c.feed_limit, 1);
        assert_eq!(c.poll_interval_secs, 30);
        assert_eq!(c.dedup_retention(), Duration::hours(1));
        assert_eq!(c.metrics_addr, Some("127.0.0.1:9100".parse().unwrap()));
        assert_eq!(c.feed_timeout_secs, 1);
        assert_eq!(c.seen_state_path, PathBuf::from("/tmp/seen.json"));
    }
}
