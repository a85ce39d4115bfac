//! Post repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{Post, PostId};
use super::filter::PostFilter;
use crate::domain::DomainError;

/// Repository for the authoritative post records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post; conflicts if the id is taken
    async fn create(&self, post: Post) -> Result<Post, DomainError>;

    /// Get a post by id
    async fn get(&self, id: &PostId) -> Result<Option<Post>, DomainError>;

    /// Posts matching `filter`, in no particular order
    async fn find(&self, filter: &PostFilter) -> Result<Vec<Post>, DomainError>;

    /// Atomically add `delta` to the like counter, clamping at zero
    async fn adjust_likes(&self, id: &PostId, delta: i64) -> Result<Post, DomainError>;

    /// Overwrite the like counter (reconciliation only)
    async fn set_like_count(&self, id: &PostId, count: u64) -> Result<Post, DomainError>;

    /// Delete a post; returns false if it did not exist
    async fn delete(&self, id: &PostId) -> Result<bool, DomainError>;
}
