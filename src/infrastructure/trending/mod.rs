//! Trending articles from the dev.to public API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TrendingConfig;
use crate::domain::trending::{TrendingArticle, TrendingFeed};
use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct ApiArticle {
    id: u64,
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    user: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    #[serde(default)]
    name: Option<String>,
}

impl From<ApiArticle> for TrendingArticle {
    fn from(article: ApiArticle) -> Self {
        Self {
            id: article.id,
            title: article.title,
            url: article.url,
            description: article.description.filter(|d| !d.trim().is_empty()),
            author: article.user.and_then(|u| u.name),
        }
    }
}

/// HTTP client for the trending feed
///
/// Any failure degrades to an empty list; the feed is decoration.
#[derive(Debug, Clone)]
pub struct DevToTrendingClient {
    client: Client,
    config: TrendingConfig,
}

impl DevToTrendingClient {
    pub fn new(config: TrendingConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("bloggy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build trending HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    async fn fetch(&self) -> Result<Vec<TrendingArticle>, reqwest::Error> {
        let articles: Vec<ApiArticle> = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("tag", self.config.tag.clone()),
                ("top", self.config.top_days.to_string()),
                ("per_page", self.config.per_page.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(articles.into_iter().map(TrendingArticle::from).collect())
    }
}

#[async_trait]
impl TrendingFeed for DevToTrendingClient {
    async fn top_articles(&self) -> Vec<TrendingArticle> {
        if !self.config.enabled {
            return Vec::new();
        }

        match self.fetch().await {
            Ok(articles) => {
                debug!(count = articles.len(), "Fetched trending articles");
                articles
            }
            Err(e) => {
                warn!(error = %e, endpoint = %self.config.endpoint, "Trending feed unavailable");
                Vec::new()
            }
        }
    }
}

/// Feed that is always empty; used when the trending section is switched off
#[derive(Debug, Clone, Default)]
pub struct NoTrending;

#[async_trait]
impl TrendingFeed for NoTrending {
    async fn top_articles(&self) -> Vec<TrendingArticle> {
        Vec::new()
    }
}
