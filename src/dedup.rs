// src/dedup.rs
//! Deduplication of repeated content within a cooldown window.
//!
//! A post is keyed by a fingerprint of its normalized text + id. The store remembers
//! when each fingerprint was last processed; a fingerprint is "fresh" when it was never
//! seen or the cooldown has fully elapsed.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SEEN_STATE_PATH: &str = "state/seen.json";

static RE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Quote characters dropped before fingerprinting (straight, curly, guillemets, backtick).
const QUOTES: [char; 9] = [
    '"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '\u{00AB}', '\u{00BB}',
];

/// Strip URLs and quotes, collapse whitespace, lower-case.
pub fn normalize_for_fingerprint(text: &str) -> String {
    let no_urls = RE_URL.replace_all(text, " ");
    let no_quotes: String = no_urls.chars().filter(|c| !QUOTES.contains(c)).collect();
    RE_WS
        .replace_all(&no_quotes, " ")
        .trim()
        .to_lowercase()
}

/// SHA-256 (hex) over normalized text and post id.
pub fn fingerprint(text: &str, id: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(normalize_for_fingerprint(text).as_bytes());
    hasher.update([0x1f]);
    hasher.update(id.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Freshness check + last-seen bookkeeping.
///
/// Callers needing the pair to be atomic (concurrent processing) must hold `&mut`
/// (or a lock around the store) across `is_fresh` and `record`.
pub trait SeenStore: Send {
    fn is_fresh(&self, fingerprint: &str, now: DateTime<Utc>) -> bool;
    fn record(&mut self, fingerprint: &str, now: DateTime<Utc>);
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store; also the core of [`FileSeenStore`].
#[derive(Debug, Clone)]
pub struct MemorySeenStore {
    window: Duration,
    entries: HashMap<String, i64>,
}

impl MemorySeenStore {
    /// Negative windows are treated as zero (every repeat is fresh once a second passes).
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(Duration::zero()),
            entries: HashMap::new(),
        }
    }

    pub fn with_entries(window: Duration, entries: HashMap<String, i64>) -> Self {
        Self {
            entries,
            ..Self::new(window)
        }
    }

    pub fn last_seen(&self, fingerprint: &str) -> Option<i64> {
        self.entries.get(fingerprint).copied()
    }

    /// Drop entries last seen before `cutoff`. Returns how many were removed.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let cutoff = cutoff.timestamp();
        self.entries.retain(|_, ts| *ts >= cutoff);
        before - self.entries.len()
    }

    pub fn entries(&self) -> &HashMap<String, i64> {
        &self.entries
    }
}

impl SeenStore for MemorySeenStore {
    fn is_fresh(&self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(fingerprint) {
            None => true,
            Some(&last) => now.timestamp() - last > self.window.num_seconds(),
        }
    }

    fn record(&mut self, fingerprint: &str, now: DateTime<Utc>) {
        self.entries.insert(fingerprint.to_string(), now.timestamp());
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// File-backed store: a flat JSON object `{ fingerprint: unix_seconds }`.
///
/// - Missing or corrupt file at startup → empty store (never fatal).
/// - Rewritten after every `record`; write failures are logged and ignored.
/// - Entries older than `retention` are pruned on load and before each write.
#[derive(Debug)]
pub struct FileSeenStore {
    path: PathBuf,
    retention: Duration,
    inner: MemorySeenStore,
}

impl FileSeenStore {
    pub fn open(path: impl Into<PathBuf>, window: Duration, retention: Duration) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        let mut inner = MemorySeenStore::with_entries(window, entries);
        let retention = retention.max(window);
        let pruned = match Utc::now().checked_sub_signed(retention) {
            Some(cutoff) => inner.prune_before(cutoff),
            None => 0,
        };
        tracing::info!(
            target: "dedup",
            path = %path.display(),
            entries = inner.len(),
            pruned,
            "seen store loaded"
        );
        Self {
            path,
            retention,
            inner,
        }
    }

    /// Write the whole map atomically (temp file + rename).
    pub fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating state dir {}", dir.display()))?;
        }
        let body = serde_json::to_vec(self.inner.entries()).context("serializing seen store")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl SeenStore for FileSeenStore {
    fn is_fresh(&self, fingerprint: &str, now: DateTime<Utc>) -> bool {
        self.inner.is_fresh(fingerprint, now)
    }

    fn record(&mut self, fingerprint: &str, now: DateTime<Utc>) {
        self.inner.record(fingerprint, now);
        // retention reaching past the representable range keeps everything
        if let Some(cutoff) = now.checked_sub_signed(self.retention) {
            self.inner.prune_before(cutoff);
        }
        if let Err(e) = self.persist() {
            tracing::warn!(target: "dedup", "persist seen store: {e:#}");
        }
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

fn read_entries(path: &Path) -> HashMap<String, i64> {
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            tracing::warn!(target: "dedup", path = %path.display(), "corrupt seen store, starting empty: {e}");
            HashMap::new()
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
        Err(e) => {
            tracing::warn!(target: "dedup", path = %path.display(), "unreadable seen store, starting empty: {e}");
            HashMap::new()
        }
    }
}
