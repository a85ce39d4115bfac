//! In-memory post repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::post::{Post, PostFilter, PostId, PostRepository};
use crate::domain::DomainError;

/// In-memory implementation of PostRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostRepository {
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_with(
        &self,
        id: &PostId,
        change: impl FnOnce(&mut Post),
    ) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;

        let post = posts
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("Post '{}' not found", id)))?;

        change(post);
        Ok(post.clone())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        let mut posts = self.posts.write().await;

        if posts.contains_key(post.id()) {
            return Err(DomainError::conflict(format!(
                "Post with ID '{}' already exists",
                post.id()
            )));
        }

        posts.insert(post.id().clone(), post.clone());
        Ok(post)
    }

    async fn get(&self, id: &PostId) -> Result<Option<Post>, DomainError> {
        let posts = self.posts.read().await;
        Ok(posts.get(id).cloned())
    }

    async fn find(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.read().await;
        Ok(posts
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn adjust_likes(&self, id: &PostId, delta: i64) -> Result<Post, DomainError> {
        self.update_with(id, |post| post.adjust_likes(delta)).await
    }

    async fn set_like_count(&self, id: &PostId, count: u64) -> Result<Post, DomainError> {
        self.update_with(id, |post| post.set_like_count(count)).await
    }

    async fn delete(&self, id: &PostId) -> Result<bool, DomainError> {
        let mut posts = self.posts.write().await;
        Ok(posts.remove(id).is_some())
    }
}
