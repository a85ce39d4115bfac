//! Like coordinator: liked-set membership and the post's counter

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::domain::post::{PostFilter, PostId, PostRepository};
use crate::domain::user::{UserId, UserRepository};
use crate::domain::DomainError;

/// Result of a like toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub post_id: PostId,
    pub liked: bool,
    pub like_count: u64,
    /// False when the request matched the existing state
    pub changed: bool,
}

/// Counters rewritten by a reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub checked: usize,
    pub corrected: usize,
    /// Users whose liked set still referenced deleted posts
    pub pruned_users: u64,
}

/// Keeps `liked_post_ids` and `like_count` moving together
///
/// Membership is changed first through an atomic store primitive that reports
/// whether anything changed; only then is the counter adjusted, also
/// atomically. The two steps are not transactional, so a failure between them
/// surfaces as `PartialWrite` and `reconcile` repairs the counter.
pub struct LikeService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl LikeService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    pub async fn set_liked(
        &self,
        actor: &UserId,
        post_id: &PostId,
        liked: bool,
    ) -> Result<LikeOutcome, DomainError> {
        let post = self
            .posts
            .get(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Post '{}' not found", post_id)))?;

        let changed = if liked {
            self.users.add_liked_post(actor, post_id).await?
        } else {
            self.users.remove_liked_post(actor, post_id).await?
        };

        if !changed {
            return Ok(LikeOutcome {
                post_id: post_id.clone(),
                liked,
                like_count: post.like_count(),
                changed: false,
            });
        }

        let delta = if liked { 1 } else { -1 };

        match self.posts.adjust_likes(post_id, delta).await {
            Ok(post) => Ok(LikeOutcome {
                post_id: post_id.clone(),
                liked,
                like_count: post.like_count(),
                changed: true,
            }),
            Err(e) => {
                error!(
                    post_id = %post_id,
                    user_id = %actor,
                    step = "adjust_like_count",
                    delta,
                    error = %e,
                    "Liked set updated but counter not adjusted"
                );
                Err(DomainError::partial_write(
                    "set_liked",
                    format!("like state for post '{}' changed but counter not: {}", post_id, e),
                ))
            }
        }
    }

    /// Drop liked ids of deleted posts, then recompute every counter from the
    /// users' liked sets
    ///
    /// Deleting a post leaves its id in likers' sets, and `set_liked` cannot
    /// clear it once the post is gone. A post created between the listing and
    /// the prune loses its likes, so run this while the server is quiet.
    pub async fn reconcile(&self) -> Result<ReconcileReport, DomainError> {
        let posts = self.posts.find(&PostFilter::All).await?;
        let existing: Vec<PostId> = posts.iter().map(|p| p.id().clone()).collect();

        let mut report = ReconcileReport {
            pruned_users: self.users.prune_liked_posts(&existing).await?,
            ..ReconcileReport::default()
        };

        if report.pruned_users > 0 {
            info!(users = report.pruned_users, "Pruned likes of deleted posts");
        }

        for post in posts {
            report.checked += 1;
            let actual = self.users.count_likers(post.id()).await?;

            if actual != post.like_count() {
                info!(
                    post_id = %post.id(),
                    stored = post.like_count(),
                    actual,
                    "Correcting like count"
                );
                self.posts.set_like_count(post.id(), actual).await?;
                report.corrected += 1;
            }
        }

        Ok(report)
    }
}
