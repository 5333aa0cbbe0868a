// src/monitor.rs
//! Poll → classify → decide → deliver → record.

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use crate::classify::{anon_hash, Classifier};
use crate::dedup::{fingerprint, SeenStore};
use crate::feed::{FeedSource, Post};
use crate::notify::format::DEFAULT_BANNER;
use crate::notify::{format_alert, DeliveryOutcome, Dispatcher};
use crate::policy::{AlertDecision, AlertPolicy, SkipReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Alerted,
    Suppressed(SkipReason),
    DeliveryFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub fetched: usize,
    /// Same id seen twice in one batch; only the first copy is processed.
    pub repeated_in_batch: usize,
    pub alerted: usize,
    pub suppressed: usize,
    pub failed: usize,
}

pub struct Monitor {
    classifier: Classifier,
    policy: AlertPolicy,
    store: Box<dyn SeenStore>,
    dispatcher: Dispatcher,
    banner: String,
    feed_limit: usize,
}

impl Monitor {
    pub fn new(
        classifier: Classifier,
        policy: AlertPolicy,
        store: Box<dyn SeenStore>,
        dispatcher: Dispatcher,
    ) -> Self {
        crate::metrics::ensure_described();
        Self {
            classifier,
            policy,
            store,
            dispatcher,
            banner: DEFAULT_BANNER.to_string(),
            feed_limit: 10,
        }
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    pub fn with_feed_limit(mut self, limit: usize) -> Self {
        self.feed_limit = limit.max(1);
        self
    }

    pub fn store(&self) -> &dyn SeenStore {
        self.store.as_ref()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Classify and decide one post, deliver if warranted, then mark it seen.
    /// The post is recorded whatever the outcome (suppressed and failed included).
    pub async fn process_post(&mut self, post: &Post, now: DateTime<Utc>) -> ProcessOutcome {
        let fp = fingerprint(&post.text, &post.id);
        let fresh = self.store.is_fresh(&fp, now);
        let result = self.classifier.classify(&post.text);
        let decision = self.policy.decide(&result, fresh);

        let outcome = match decision {
            AlertDecision::Emit => {
                let msg = format_alert(&self.banner, &post.url, &post.text, &result);
                match self.dispatcher.send(&msg).await {
                    DeliveryOutcome::Delivered => {
                        counter!("alerts_sent_total").increment(1);
                        ProcessOutcome::Alerted
                    }
                    failed => ProcessOutcome::DeliveryFailed(failed.to_string()),
                }
            }
            AlertDecision::Skip(reason) => {
                counter!("alerts_suppressed_total", "reason" => reason.as_str()).increment(1);
                tracing::debug!(
                    target: "monitor",
                    post = %post.id,
                    id = %anon_hash(&post.text),
                    %reason,
                    "suppressed"
                );
                ProcessOutcome::Suppressed(reason)
            }
        };

        self.store.record(&fp, now);
        counter!("posts_processed_total").increment(1);
        gauge!("seen_store_entries").set(self.store.len() as f64);
        outcome
    }

    /// Fetch one batch and process it in feed order.
    pub async fn run_cycle(
        &mut self,
        feed: &dyn FeedSource,
        now: DateTime<Utc>,
    ) -> Result<CycleSummary> {
        let posts = feed.fetch_latest(self.feed_limit).await?;
        gauge!("poll_last_run_ts").set(now.timestamp() as f64);

        let mut summary = CycleSummary {
            fetched: posts.len(),
            ..CycleSummary::default()
        };
        let mut handled: HashSet<&str> = HashSet::with_capacity(posts.len());

        for post in &posts {
            if !handled.insert(post.id.as_str()) {
                summary.repeated_in_batch += 1;
                continue;
            }
            match self.process_post(post, now).await {
                ProcessOutcome::Alerted => summary.alerted += 1,
                ProcessOutcome::Suppressed(_) => summary.suppressed += 1,
                ProcessOutcome::DeliveryFailed(_) => summary.failed += 1,
            }
        }

        tracing::info!(
            target: "monitor",
            feed = feed.name(),
            fetched = summary.fetched,
            alerted = summary.alerted,
            suppressed = summary.suppressed,
            failed = summary.failed,
            "cycle done"
        );
        Ok(summary)
    }

    /// One poll. A feed error is logged and counted in `feed_errors_total`
    /// (the only place that counter moves) and the cycle is skipped.
    pub async fn poll_once(&mut self, feed: &dyn FeedSource) -> Option<CycleSummary> {
        match self.run_cycle(feed, Utc::now()).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                counter!("feed_errors_total").increment(1);
                tracing::warn!(target: "monitor", feed = feed.name(), "cycle skipped: {e:#}");
                None
            }
        }
    }

    /// Poll forever; feed errors never stop the loop.
    pub async fn run(&mut self, feed: &dyn FeedSource, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.poll_once(feed).await;
        }
    }
}
