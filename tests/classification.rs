use std::sync::Arc;

use post_impact_alerts::sentiment::PolarityScorer;
use post_impact_alerts::{
    AlertDecision, AlertPolicy, Classifier, Lexicon, SentimentLabel, SkipReason,
};

/// Fixed compound score so tests do not depend on the VADER lexicon.
struct Fixed(f32);

impl PolarityScorer for Fixed {
    fn compound(&self, _text: &str) -> f32 {
        self.0
    }
}

fn lexicon() -> Arc<Lexicon> {
    Arc::new(Lexicon::builtin().expect("built-in lexicon"))
}

#[test]
fn fed_hike_alerts_with_defaults() {
    let c = Classifier::with_vader(lexicon());
    let r = c.classify("BREAKING: Fed hikes rates immediately!!!");

    assert!(r.tags.iter().any(|t| t == "Fed"));
    assert_eq!(r.sentiment, SentimentLabel::Bearish);
    assert!(r.sentiment_confidence >= 0.65);
    assert!(r.is_finance);
    assert!(r.must_alert);
    assert!(r.impact_score >= 0.60);
    assert_eq!(AlertPolicy::default().decide(&r, true), AlertDecision::Emit);
}

#[test]
fn lunch_is_not_finance() {
    let c = Classifier::with_vader(lexicon());
    let r = c.classify("I had a great lunch today");

    assert!(!r.is_finance);
    assert!(!r.is_crypto);
    assert!(r.tags.is_empty());
    assert!(!r.must_alert);
    assert_eq!(
        AlertPolicy::default().decide(&r, true),
        AlertDecision::Skip(SkipReason::NotFinance)
    );
}

#[test]
fn crypto_post_is_crypto_and_finance() {
    let c = Classifier::new(lexicon(), Arc::new(Fixed(0.0)));
    let r = c.classify("The SEC will approve spot ETFs for Bitcoin");

    assert!(r.is_crypto);
    assert!(r.is_finance);
    assert!(r.must_alert);
    assert_eq!(r.sentiment, SentimentLabel::Bullish);

    let crypto_only = AlertPolicy {
        crypto_only: true,
        ..AlertPolicy::default()
    };
    assert_eq!(crypto_only.decide(&r, true), AlertDecision::Emit);
}

#[test]
fn word_boundaries_prevent_false_hits() {
    let c = Classifier::new(lexicon(), Arc::new(Fixed(0.0)));
    let r = c.classify("Give me a second, the bank banner is up");
    assert!(!r.is_crypto, "`sec` must not match `second`");
    assert!(!r.must_alert, "`ban` must not match `bank`/`banner`");
}

#[test]
fn bearish_trigger_wins_over_bullish() {
    let c = Classifier::new(lexicon(), Arc::new(Fixed(0.9)));
    let r = c.classify("Ceasefire talks collapse, new sanctions on Russia");
    assert_eq!(r.sentiment, SentimentLabel::Bearish);
    assert!(r.sentiment_confidence >= 0.65);
}

#[test]
fn substituted_lexicon_changes_behaviour() {
    let toml = r#"
version = "test"

[[topics]]
name = "Widgets"
weight = 1.0
patterns = ['\bwidgets?\b']

[alerts]
always = []

[relevance]
crypto_terms = []
finance_terms = []

[urgency]
immediacy = []

[sentiment]
bullish_triggers = []
bearish_triggers = []
"#;
    let lex = Arc::new(Lexicon::from_toml_str(toml).expect("test lexicon"));
    let c = Classifier::new(lex, Arc::new(Fixed(0.5)));

    let r = c.classify("widgets everywhere");
    assert_eq!(r.tags, vec!["Widgets".to_string()]);
    assert!(r.is_finance, "topics are finance topics unless marked otherwise");

    let r = c.classify("Fed hikes rates");
    assert!(r.tags.is_empty());
    assert!(!r.is_finance);
}
