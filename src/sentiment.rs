// src/sentiment.rs
//! Market sentiment: a general-purpose polarity score mapped to Bullish/Bearish/Neutral,
//! then overridden by finance-specific trigger phrases from the lexicon.

use serde::{Deserialize, Serialize};
use std::fmt;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::impact::{clamp01, round2};
use crate::lexicon::Lexicon;

/// Source of a compound polarity score in [-1, 1].
pub trait PolarityScorer: Send + Sync {
    fn compound(&self, text: &str) -> f32;
}

/// VADER (valence-aware lexicon) polarity.
pub struct VaderPolarity {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderPolarity {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderPolarity {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderPolarity {
    fn compound(&self, text: &str) -> f32 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let scores = self.analyzer.polarity_scores(text);
        let c = scores.get("compound").copied().unwrap_or(0.0) as f32;
        if c.is_finite() {
            c.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Bullish => "Bullish",
            SentimentLabel::Bearish => "Bearish",
            SentimentLabel::Neutral => "Neutral",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            SentimentLabel::Bullish => "🟢📈",
            SentimentLabel::Bearish => "🔴📉",
            SentimentLabel::Neutral => "⚪🤝",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    /// In [0, 1], rounded to two decimals.
    pub confidence: f32,
}

/// Map the compound score, then apply trigger overrides.
/// Bearish triggers run after bullish ones, so a text with both ends up Bearish.
pub fn fin_sentiment(lexicon: &Lexicon, polarity: &dyn PolarityScorer, text: &str) -> Sentiment {
    let s = &lexicon.scoring;
    let compound = polarity.compound(text);

    let (mut label, mut confidence) = if compound >= s.bullish_compound {
        (SentimentLabel::Bullish, compound)
    } else if compound <= s.bearish_compound {
        (SentimentLabel::Bearish, -compound)
    } else {
        (SentimentLabel::Neutral, 1.0 - compound.abs())
    };

    let lowered = text.to_lowercase();
    if lexicon.has_bullish_trigger(&lowered) {
        label = SentimentLabel::Bullish;
        confidence = confidence.max(s.override_confidence);
    }
    if lexicon.has_bearish_trigger(&lowered) {
        label = SentimentLabel::Bearish;
        confidence = confidence.max(s.override_confidence);
    }

    Sentiment {
        label,
        confidence: round2(clamp01(confidence)),
    }
}
