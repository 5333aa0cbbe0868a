// src/relevance.rs
//! Relevance gate: is the post about crypto, and is it about finance/markets at all.

use serde::Serialize;

use crate::lexicon::Lexicon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Relevance {
    pub is_crypto: bool,
    pub is_finance: bool,
}

pub fn is_crypto_related(lexicon: &Lexicon, text: &str, tags: &[String]) -> bool {
    if tags
        .iter()
        .any(|t| t.to_ascii_lowercase().starts_with("crypto"))
    {
        return true;
    }
    lexicon.matches_crypto_term(&text.to_lowercase())
}

/// Finance relevance without the crypto shortcut (see [`classify_relevance`]).
pub fn is_financial_related(lexicon: &Lexicon, text: &str, tags: &[String]) -> bool {
    if tags.iter().any(|t| lexicon.is_finance_topic(t)) {
        return true;
    }
    lexicon.matches_finance_term(&text.to_lowercase())
}

/// Crypto implies finance.
pub fn classify_relevance(lexicon: &Lexicon, text: &str, tags: &[String]) -> Relevance {
    let is_crypto = is_crypto_related(lexicon, text, tags);
    let is_finance = is_crypto || is_financial_related(lexicon, text, tags);
    Relevance {
        is_crypto,
        is_finance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex() -> Lexicon {
        Lexicon::builtin().expect("built-in lexicon")
    }

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn crypto_by_tag_prefix() {
        let r = classify_relevance(&lex(), "nothing here", &tags(&["CRYPTO/Reg"]));
        assert!(r.is_crypto);
        assert!(r.is_finance, "crypto implies finance");
    }

    #[test]
    fn crypto_by_term() {
        let lx = lex();
        assert!(is_crypto_related(&lx, "Coinbase listing", &[]));
        assert!(is_crypto_related(&lx, "Bitcoin miners after the halving", &[]));
        assert!(!is_crypto_related(&lx, "a second opinion", &[]));
    }

    #[test]
    fn finance_by_tag() {
        let lx = lex();
        for t in ["Fed", "Geopolitics", "Energy", "Trade", "Fiscal", "Crypto/Reg", "Big Tech"] {
            assert!(is_financial_related(&lx, "", &tags(&[t])), "tag {t}");
        }
        assert!(!is_financial_related(&lx, "", &tags(&["Sports"])));
    }

    #[test]
    fn finance_by_term() {
        let lx = lex();
        assert!(is_financial_related(&lx, "Talking with Ukraine about the conflict", &[]));
        assert!(is_financial_related(&lx, "The DOJ antitrust case", &[]));
        assert!(!is_financial_related(&lx, "I had a great lunch today", &[]));
    }

    #[test]
    fn unrelated_text() {
        let r = classify_relevance(&lex(), "Happy birthday to my wonderful wife", &[]);
        assert_eq!(r, Relevance::default());
    }
}
