// src/policy.rs
//! Alert decision policy: freshness, scope, sentiment gate and impact gate.
//! Pure and synchronous; the caller records the fingerprint whatever the outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify::ClassificationResult;
use crate::sentiment::SentimentLabel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub impact_threshold: f32,
    pub finance_only: bool,
    pub crypto_only: bool,
    pub require_non_neutral: bool,
    pub min_sentiment_confidence: f32,
    /// Neutral posts may still alert when impact reaches this level.
    pub neutral_override_impact: f32,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            impact_threshold: 0.60,
            finance_only: true,
            crypto_only: false,
            require_non_neutral: true,
            min_sentiment_confidence: 0.65,
            neutral_override_impact: 0.90,
        }
    }
}

/// Why a post did not alert. Gates are checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Duplicate,
    NotFinance,
    NotCrypto,
    NeutralSentiment,
    LowSentimentConfidence,
    BelowThreshold,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Duplicate => "duplicate",
            SkipReason::NotFinance => "not_finance",
            SkipReason::NotCrypto => "not_crypto",
            SkipReason::NeutralSentiment => "neutral_sentiment",
            SkipReason::LowSentimentConfidence => "low_sentiment_confidence",
            SkipReason::BelowThreshold => "below_threshold",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDecision {
    Emit,
    Skip(SkipReason),
}

impl AlertPolicy {
    pub fn decide(&self, r: &ClassificationResult, fresh: bool) -> AlertDecision {
        use AlertDecision::Skip;

        if !fresh {
            return Skip(SkipReason::Duplicate);
        }

        if self.finance_only && !r.is_finance {
            return Skip(SkipReason::NotFinance);
        }
        if self.crypto_only && !r.is_crypto {
            return Skip(SkipReason::NotCrypto);
        }

        if r.sentiment == SentimentLabel::Neutral {
            if self.require_non_neutral && r.impact_score < self.neutral_override_impact {
                return Skip(SkipReason::NeutralSentiment);
            }
        } else if r.sentiment_confidence < self.min_sentiment_confidence {
            return Skip(SkipReason::LowSentimentConfidence);
        }

        if r.impact_score >= self.impact_threshold || r.must_alert {
            AlertDecision::Emit
        } else {
            Skip(SkipReason::BelowThreshold)
        }
    }
}
