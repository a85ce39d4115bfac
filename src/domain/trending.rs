//! Trending articles shown next to the feed

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An article from the external trending feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingArticle {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// Source of trending articles; never fails, an outage yields an empty list
#[async_trait]
pub trait TrendingFeed: Send + Sync {
    async fn top_articles(&self) -> Vec<TrendingArticle>;
}
