//! Classify ad-hoc text and preview the alert it would produce.
//!
//! ```text
//! classify_text "BREAKING: Fed hikes rates immediately!!!"
//! echo "..." | classify_text
//! ```

use anyhow::{Context, Result};
use std::io::Read;
use std::sync::Arc;

use post_impact_alerts::notify::format_alert;
use post_impact_alerts::{AppConfig, Classifier, Lexicon};

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        buf
    } else {
        args.join(" ")
    };
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("no text given (pass it as arguments or on stdin)");
    }

    let cfg = AppConfig::from_env();
    let lexicon = Lexicon::load(cfg.lexicon_path.as_deref())?;
    let classifier = Classifier::with_vader(Arc::new(lexicon));

    let result = classifier.classify(text);
    let decision = cfg.policy.decide(&result, true);

    println!("{}", serde_json::to_string_pretty(&result)?);
    println!("decision: {decision:?}");
    println!();
    println!(
        "{}",
        format_alert(&cfg.alert_banner, "https://example.invalid/post", text, &result)
    );
    Ok(())
}
