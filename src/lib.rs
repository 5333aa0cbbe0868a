// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod classify;
pub mod config;
pub mod dedup;
pub mod feed;
pub mod impact;
pub mod lexicon;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod policy;
pub mod relevance;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::classify::{ClassificationResult, Classifier};
pub use crate::config::AppConfig;
pub use crate::dedup::{fingerprint, FileSeenStore, MemorySeenStore, SeenStore};
pub use crate::feed::{FeedSource, Post, RssFeed};
pub use crate::lexicon::Lexicon;
pub use crate::monitor::{CycleSummary, Monitor, ProcessOutcome};
pub use crate::notify::{AlertSink, DeliveryOutcome, Dispatcher, LogSink, TelegramSink};
pub use crate::policy::{AlertDecision, AlertPolicy, SkipReason};
pub use crate::sentiment::SentimentLabel;

