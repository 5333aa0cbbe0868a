//! Post monitor: binary entrypoint.
//! Polls the feed, classifies each post and pushes alerts to Telegram (or the log in dry-run).

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use post_impact_alerts::notify::AlertSink;
use post_impact_alerts::{
    AppConfig, Classifier, Dispatcher, FileSeenStore, Lexicon, LogSink, Monitor, RssFeed,
    TelegramSink,
};

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    init_tracing(json);

    let cfg = AppConfig::from_env();
    post_impact_alerts::metrics::install_exporter(cfg.metrics_addr)?;

    let lexicon = Lexicon::load(cfg.lexicon_path.as_deref()).context("loading lexicon")?;
    tracing::info!(version = %lexicon.version, topics = lexicon.topics().len(), "lexicon loaded");
    let classifier = Classifier::with_vader(Arc::new(lexicon));

    let store = FileSeenStore::open(
        &cfg.seen_state_path,
        cfg.dedup_window(),
        cfg.dedup_retention(),
    );

    let (sink, recipient): (Box<dyn AlertSink>, String) = match cfg.telegram() {
        Some((token, chat_id)) => (
            Box::new(TelegramSink::new(token.to_string()).with_timeout(cfg.delivery_timeout_secs)),
            chat_id.to_string(),
        ),
        None => {
            tracing::warn!("telegram disabled (DRY_RUN or missing TELEGRAM_TOKEN/TELEGRAM_CHAT_ID); alerts go to the log");
            (Box::new(LogSink), "dry-run".to_string())
        }
    };

    let mut monitor = Monitor::new(
        classifier,
        cfg.policy,
        Box::new(store),
        Dispatcher::new(sink, recipient),
    )
    .with_banner(cfg.alert_banner.clone())
    .with_feed_limit(cfg.feed_limit);

    let feed = RssFeed::from_url(cfg.feed_url.clone()).with_timeout(cfg.feed_timeout_secs);
    tracing::info!(
        feed = %cfg.feed_url,
        interval_secs = cfg.poll_interval_secs,
        threshold = cfg.policy.impact_threshold,
        "monitor starting"
    );

    tokio::select! {
        _ = monitor.run(&feed, Duration::from_secs(cfg.poll_interval_secs)) => {}
        res = tokio::signal::ctrl_c() => {
            res.context("waiting for ctrl-c")?;
            tracing::info!("shutdown requested");
        }
    }
    Ok(())
}
