// src/feed/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One post as delivered by a feed. Lives for a single pipeline pass.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub url: String,
    pub text: String, // normalized text
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    /// Latest posts, newest first as the feed orders them, at most `limit`.
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<Post>>;
    fn name(&self) -> &'static str;
}
