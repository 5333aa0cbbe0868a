// src/lexicon.rs
//! Scoring lexicon: topic patterns + weights, must-alert keywords, relevance terms,
//! urgency phrases, sentiment trigger phrases and the scoring constants.
//!
//! The lexicon is data, not code. A built-in copy is embedded from
//! `config/lexicon.toml`; `LEXICON_PATH` may point at a replacement file.
//! Once compiled it is immutable and shared read-only (wrap it in an `Arc`).

use anyhow::{anyhow, Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_LEXICON_TOML: &str = include_str!("../config/lexicon.toml");
pub const ENV_LEXICON_PATH: &str = "LEXICON_PATH";

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconRoot {
    pub version: String,
    #[serde(default)]
    pub scoring: ScoringCfg,
    pub topics: Vec<TopicCfg>,
    #[serde(default)]
    pub alerts: AlertsCfg,
    #[serde(default)]
    pub relevance: RelevanceCfg,
    #[serde(default)]
    pub urgency: UrgencyCfg,
    #[serde(default)]
    pub sentiment: SentimentCfg,
}

/// Numeric knobs of the impact scorer and sentiment mapping.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringCfg {
    /// Contribution per matching pattern (capped at 1.0 per topic before weighting).
    pub hit_weight: f32,
    pub exclamation_bonus: f32,
    pub caps_bonus: f32,
    pub caps_max: usize,
    pub percent_bonus: f32,
    pub immediacy_bonus: f32,
    pub must_alert_floor: f32,
    pub bullish_compound: f32,
    pub bearish_compound: f32,
    pub override_confidence: f32,
}

impl Default for ScoringCfg {
    fn default() -> Self {
        Self {
            hit_weight: 0.2,
            exclamation_bonus: 0.05,
            caps_bonus: 0.05,
            caps_max: 4,
            percent_bonus: 0.08,
            immediacy_bonus: 0.06,
            must_alert_floor: 0.6,
            bullish_compound: 0.2,
            bearish_compound: -0.2,
            override_confidence: 0.65,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicCfg {
    pub name: String,
    pub weight: f32,
    /// Whether a tag of this topic marks the post as finance-related.
    #[serde(default = "default_true")]
    pub finance: bool,
    pub patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertsCfg {
    #[serde(default)]
    pub always: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelevanceCfg {
    #[serde(default)]
    pub crypto_terms: Vec<String>,
    #[serde(default)]
    pub finance_terms: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrgencyCfg {
    /// Plain phrases (not regexes); matched as whole words.
    #[serde(default)]
    pub immediacy: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentimentCfg {
    #[serde(default)]
    pub bullish_triggers: Vec<String>,
    #[serde(default)]
    pub bearish_triggers: Vec<String>,
}

/* ----------------------------
Compiled lexicon
---------------------------- */

#[derive(Debug)]
pub struct Topic {
    pub name: String,
    pub weight: f32,
    pub finance: bool,
    patterns: Vec<Regex>,
}

impl Topic {
    /// Number of distinct patterns that match `text` (not the number of occurrences).
    pub fn hits(&self, text: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(text)).count()
    }
}

#[derive(Debug)]
pub struct Lexicon {
    pub version: String,
    pub scoring: ScoringCfg,
    topics: Vec<Topic>,
    always_alert: Vec<Regex>,
    crypto_terms: Vec<Regex>,
    finance_terms: Vec<Regex>,
    immediacy: Option<Regex>,
    bullish_triggers: Vec<Regex>,
    bearish_triggers: Vec<Regex>,
}

fn compile(section: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| anyhow!("{section} pattern `{pattern}` regex error: {e}"))
}

fn compile_all(section: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(section, p)).collect()
}

fn any_match(set: &[Regex], text: &str) -> bool {
    set.iter().any(|re| re.is_match(text))
}

impl Lexicon {
    /// The lexicon shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_LEXICON_TOML).context("parsing built-in lexicon")
    }

    /// The lexicon at `path` if given (see `$LEXICON_PATH`), otherwise the built-in one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::builtin(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("lexicon {}", path.display()))
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let root: LexiconRoot = toml::from_str(toml_str)?;

        let topics = root
            .topics
            .iter()
            .map(|t| {
                if t.name.trim().is_empty() {
                    return Err(anyhow!("topic with empty name"));
                }
                if !(t.weight > 0.0 && t.weight <= 1.0) {
                    return Err(anyhow!(
                        "topic `{}` weight {} outside (0, 1]",
                        t.name,
                        t.weight
                    ));
                }
                let patterns = compile_all(&format!("topic `{}`", t.name), &t.patterns)?;
                Ok(Topic {
                    name: t.name.clone(),
                    weight: t.weight,
                    finance: t.finance,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let immediacy = if root.urgency.immediacy.is_empty() {
            None
        } else {
            let alternation = root
                .urgency
                .immediacy
                .iter()
                .map(|p| regex::escape(p.trim()))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile("urgency", &format!(r"\b(?:{alternation})\b"))?)
        };

        Ok(Self {
            version: root.version,
            scoring: root.scoring,
            topics,
            always_alert: compile_all("always-alert", &root.alerts.always)?,
            crypto_terms: compile_all("crypto term", &root.relevance.crypto_terms)?,
            finance_terms: compile_all("finance term", &root.relevance.finance_terms)?,
            immediacy,
            bullish_triggers: compile_all("bullish trigger", &root.sentiment.bullish_triggers)?,
            bearish_triggers: compile_all("bearish trigger", &root.sentiment.bearish_triggers)?,
        })
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// True if `tag` names a topic flagged as finance-related.
    pub fn is_finance_topic(&self, tag: &str) -> bool {
        self.topics.iter().any(|t| t.finance && t.name == tag)
    }

    pub fn matches_always_alert(&self, text: &str) -> bool {
        any_match(&self.always_alert, text)
    }

    pub fn matches_crypto_term(&self, text: &str) -> bool {
        any_match(&self.crypto_terms, text)
    }

    pub fn matches_finance_term(&self, text: &str) -> bool {
        any_match(&self.finance_terms, text)
    }

    /// Non-overlapping immediacy phrase occurrences ("right now" counts once).
    pub fn immediacy_count(&self, text: &str) -> usize {
        self.immediacy
            .as_ref()
            .map(|re| re.find_iter(text).count())
            .unwrap_or(0)
    }

    pub fn has_bullish_trigger(&self, text: &str) -> bool {
        any_match(&self.bullish_triggers, text)
    }

    pub fn has_bearish_trigger(&self, text: &str) -> bool {
        any_match(&self.bearish_triggers, text)
    }
}
