//! User repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(test)]
use mockall::automock;

use super::entity::{User, UserId};
use crate::domain::post::{Post, PostId};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// The liked-post set and the mirrored post list are only changed through the
/// dedicated single-record primitives below, never by `update`, so concurrent
/// likes and submissions do not overwrite each other.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by their ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by login email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by display handle
    async fn get_by_handle(&self, handle: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by the identity provider's stable id
    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError>;

    /// Find the user holding `token`, ignoring tokens that expired at or before `now`
    async fn find_by_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError>;

    /// Create a new user; conflicts on email, handle or external id
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Persist profile fields (email, handle, verification state, role)
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Add `post_id` to the liked set; returns false if it was already present
    async fn add_liked_post(&self, id: &UserId, post_id: &PostId) -> Result<bool, DomainError>;

    /// Remove `post_id` from the liked set; returns false if it was absent
    async fn remove_liked_post(&self, id: &UserId, post_id: &PostId)
        -> Result<bool, DomainError>;

    /// Append a post copy to the user's mirrored list
    async fn push_post(&self, id: &UserId, post: &Post) -> Result<(), DomainError>;

    /// Remove the mirrored copy of `post_id`; returns false if none was present
    async fn pull_post(&self, id: &UserId, post_id: &PostId) -> Result<bool, DomainError>;

    /// Number of users whose liked set contains `post_id`
    async fn count_likers(&self, post_id: &PostId) -> Result<u64, DomainError>;

    /// Remove every liked id not in `existing` from all liked sets;
    /// returns the number of users changed
    async fn prune_liked_posts(&self, existing: &[PostId]) -> Result<u64, DomainError>;
}
