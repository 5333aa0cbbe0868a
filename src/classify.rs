// src/classify.rs
//! Per-post classification: impact, tags, sentiment and relevance in one record.
//! Pure apart from one diagnostic log line; never fails.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::impact::market_impact_score;
use crate::lexicon::Lexicon;
use crate::relevance::classify_relevance;
use crate::sentiment::{fin_sentiment, PolarityScorer, SentimentLabel, VaderPolarity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub impact_score: f32,
    pub tags: Vec<String>,
    pub must_alert: bool,
    pub sentiment: SentimentLabel,
    pub sentiment_confidence: f32,
    pub is_crypto: bool,
    pub is_finance: bool,
}

/// Holds the immutable lexicon and polarity scorer; cheap to clone.
#[derive(Clone)]
pub struct Classifier {
    lexicon: Arc<Lexicon>,
    polarity: Arc<dyn PolarityScorer>,
}

impl Classifier {
    pub fn new(lexicon: Arc<Lexicon>, polarity: Arc<dyn PolarityScorer>) -> Self {
        Self { lexicon, polarity }
    }

    /// Lexicon + VADER polarity.
    pub fn with_vader(lexicon: Arc<Lexicon>) -> Self {
        Self::new(lexicon, Arc::new(VaderPolarity::new()))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn classify(&self, text: &str) -> ClassificationResult {
        let impact = market_impact_score(&self.lexicon, text);
        let sentiment = fin_sentiment(&self.lexicon, self.polarity.as_ref(), text);
        let relevance = classify_relevance(&self.lexicon, text, &impact.tags);

        let result = ClassificationResult {
            impact_score: impact.score,
            tags: impact.tags,
            must_alert: impact.must_alert,
            sentiment: sentiment.label,
            sentiment_confidence: sentiment.confidence,
            is_crypto: relevance.is_crypto,
            is_finance: relevance.is_finance,
        };

        // Never log raw text. Only hashed id + signals.
        info!(
            target: "classify",
            id = %anon_hash(text),
            impact = result.impact_score,
            sentiment = %result.sentiment,
            confidence = result.sentiment_confidence,
            tags = ?result.tags,
            crypto = result.is_crypto,
            finance = result.is_finance,
            must = result.must_alert,
            "classified"
        );

        result
    }
}

/// Short, stable id for a text (first 6 bytes of SHA-256, hex).
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::tests::FixedPolarity;

    fn classifier(compound: f32) -> Classifier {
        Classifier::new(
            Arc::new(Lexicon::builtin().unwrap()),
            Arc::new(FixedPolarity(compound)),
        )
    }

    #[test]
    fn composes_all_signals() {
        let r = classifier(0.0).classify("New tariffs on China imports start today!");
        assert!(r.tags.contains(&"Trade".to_string()));
        assert!(r.tags.contains(&"Geopolitics".to_string()));
        assert!(r.must_alert);
        assert!(r.is_finance);
        assert!(!r.is_crypto);
        assert!(r.impact_score >= 0.6);
    }

    #[test]
    fn empty_text_degrades_to_neutral_zero() {
        let r = classifier(0.0).classify("");
        assert_eq!(r.impact_score, 0.0);
        assert!(r.tags.is_empty());
        assert!(!r.must_alert);
        assert_eq!(r.sentiment, SentimentLabel::Neutral);
        assert!(!r.is_finance);
    }

    #[test]
    fn deterministic_for_same_text() {
        let c = Classifier::with_vader(Arc::new(Lexicon::builtin().unwrap()));
        let t = "Bitcoin to the MOON, SEC approves spot ETF!!";
        assert_eq!(c.classify(t), c.classify(t));
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("hello");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("hello"));
        assert_ne!(a, anon_hash("hello!"));
    }
}
