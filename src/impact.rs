// src/impact.rs
//! Market-impact scoring: weighted topic keyword hits plus urgency cues.
//!
//! score = Σ_topics min(1, hit_weight × hits) × weight
//!       + exclamations, capitalized words (capped), percentages, immediacy phrases
//! clamped to [0, 1]; a must-alert keyword floors the result.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::lexicon::Lexicon;

// Shouting: four or more consecutive capitals ("BREAKING", "HUGE").
static RE_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{4,}\b").unwrap());
static RE_PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,3}(?:\.\d+)?%").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ImpactScore {
    pub score: f32,
    pub tags: Vec<String>,
    pub must_alert: bool,
}

/// Urgency cues counted on the raw text (case matters for capitals).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrgencyCues {
    pub exclamations: usize,
    pub caps_words: usize,
    pub percents: usize,
    pub immediacy: usize,
}

impl UrgencyCues {
    pub fn detect(lexicon: &Lexicon, raw: &str, lowered: &str) -> Self {
        Self {
            exclamations: raw.matches('!').count(),
            caps_words: RE_CAPS.find_iter(raw).count(),
            percents: RE_PERCENT.find_iter(raw).count(),
            immediacy: lexicon.immediacy_count(lowered),
        }
    }

    fn bonus(&self, lexicon: &Lexicon) -> f32 {
        let s = &lexicon.scoring;
        s.exclamation_bonus * self.exclamations as f32
            + s.caps_bonus * self.caps_words.min(s.caps_max) as f32
            + s.percent_bonus * self.percents as f32
            + s.immediacy_bonus * self.immediacy as f32
    }
}

pub fn market_impact_score(lexicon: &Lexicon, text: &str) -> ImpactScore {
    if text.trim().is_empty() {
        return ImpactScore::default();
    }
    let lowered = text.to_lowercase();
    let scoring = &lexicon.scoring;

    let mut score = 0.0f32;
    let mut tags = Vec::new();
    for topic in lexicon.topics() {
        let hits = topic.hits(&lowered);
        if hits > 0 {
            tags.push(topic.name.clone());
            score += (scoring.hit_weight * hits as f32).min(1.0) * topic.weight;
        }
    }

    score += UrgencyCues::detect(lexicon, text, &lowered).bonus(lexicon);
    let mut score = clamp01(score);

    let must_alert = lexicon.matches_always_alert(&lowered);
    if must_alert {
        score = score.max(scoring.must_alert_floor);
    }

    ImpactScore {
        score: round2(score),
        tags,
        must_alert,
    }
}

/// Human label for an impact score, with the emoji used in alerts.
pub fn impact_level(score: f32) -> (&'static str, &'static str) {
    if score >= 0.90 {
        ("🔥", "VERY HIGH")
    } else if score >= 0.75 {
        ("🚨", "HIGH")
    } else if score >= 0.60 {
        ("⚠️", "MEDIUM")
    } else {
        ("💤", "LOW")
    }
}

pub(crate) fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

pub(crate) fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}
