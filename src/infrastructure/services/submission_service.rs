//! Submission pipeline: compose, persist and mirror posts; delete them again

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::post::{MarkdownRenderer, Post, PostDraft, PostId, PostRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::{can_delete, DomainError};

const NOT_AUTHORIZED: &str = "You are not authorized to delete this post.";

/// Writes posts to the post store and the author's mirrored list
pub struct SubmissionService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    renderer: Arc<dyn MarkdownRenderer>,
}

impl SubmissionService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        renderer: Arc<dyn MarkdownRenderer>,
    ) -> Self {
        Self {
            posts,
            users,
            renderer,
        }
    }

    /// Publish a post for `actor`
    ///
    /// Author fields come from the stored user record, never from the request.
    /// If the post is stored but the mirror append fails the result is
    /// `PartialWrite`; the authoritative post is left in place.
    pub async fn submit(&self, actor: &UserId, draft: PostDraft) -> Result<Post, DomainError> {
        draft.validate()?;

        let author = self.load_actor(actor).await?;

        if !author.is_verified() {
            return Err(DomainError::unverified(
                "Please verify your email before posting.",
            ));
        }

        let post = Post::compose(PostId::generate(), draft, &author, self.renderer.as_ref());
        let post = self.posts.create(post).await?;

        if let Err(e) = self.users.push_post(author.id(), &post).await {
            error!(
                post_id = %post.id(),
                user_id = %author.id(),
                step = "mirror_append",
                error = %e,
                "Post stored but not mirrored to author"
            );
            return Err(DomainError::partial_write(
                "submit",
                format!("post '{}' stored but not mirrored: {}", post.id(), e),
            ));
        }

        info!(post_id = %post.id(), user_id = %author.id(), "Post published");

        Ok(post)
    }

    /// Delete a post as `actor`, removing both the record and the mirrored copy
    pub async fn delete(&self, actor: &UserId, post_id: &PostId) -> Result<(), DomainError> {
        let post = self
            .posts
            .get(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Post '{}' not found", post_id)))?;

        let actor = self.load_actor(actor).await?;

        if !can_delete(&actor, &post) {
            warn!(post_id = %post_id, user_id = %actor.id(), "Delete refused");
            return Err(DomainError::forbidden(NOT_AUTHORIZED));
        }

        let (record, mirror) = tokio::join!(
            self.posts.delete(post_id),
            self.users.pull_post(post.author_id(), post_id)
        );

        match (record, mirror) {
            (Ok(_), Ok(true)) => {
                info!(post_id = %post_id, user_id = %actor.id(), "Post deleted");
                Ok(())
            }
            (Ok(_), Ok(false)) => {
                warn!(
                    post_id = %post_id,
                    author_id = %post.author_id(),
                    "Post deleted; author had no mirrored copy"
                );
                Ok(())
            }
            (Ok(_), Err(e)) => {
                error!(
                    post_id = %post_id,
                    author_id = %post.author_id(),
                    step = "mirror_pull",
                    error = %e,
                    "Post deleted but mirrored copy remains"
                );
                Err(DomainError::partial_write(
                    "delete",
                    format!("post '{}' deleted but mirror not updated: {}", post_id, e),
                ))
            }
            (Err(e), Ok(_)) => {
                error!(
                    post_id = %post_id,
                    author_id = %post.author_id(),
                    step = "record_delete",
                    error = %e,
                    "Mirrored copy removed but post record remains"
                );
                Err(DomainError::partial_write(
                    "delete",
                    format!("mirror updated but post '{}' not deleted: {}", post_id, e),
                ))
            }
            (Err(e), Err(mirror_error)) => {
                error!(post_id = %post_id, error = %mirror_error, "Mirror pull also failed");
                Err(e)
            }
        }
    }

    async fn load_actor(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::unauthenticated("Please sign in to continue."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::{MockPostRepository, PostFilter};
    use crate::domain::user::MockUserRepository;
    use crate::infrastructure::services::test_support::*;

    fn service(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
    ) -> SubmissionService {
        SubmissionService::new(posts, users, Arc::new(PlainRenderer))
    }

    #[tokio::test]
    async fn test_submit_writes_both_stores() {
        let ada = verified_user("ada");
        let (users, posts) = stores(&[ada.clone()]).await;
        let svc = service(posts.clone(), users.clone());

        let post = svc
            .submit(ada.id(), PostDraft::new("Hello", "World", Some("# Hi".into())))
            .await
            .unwrap();

        assert_eq!(post.author_id(), ada.id());
        assert_eq!(post.author_handle(), "ada");
        assert_eq!(post.like_count(), 0);
        assert_eq!(post.sanitized_html(), "<p># Hi</p>");

        assert!(posts.get(post.id()).await.unwrap().is_some());
        let mirrored = users.get(ada.id()).await.unwrap().unwrap();
        assert_eq!(mirrored.posts().len(), 1);
        assert_eq!(mirrored.posts()[0].id(), post.id());
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_fields() {
        let ada = verified_user("ada");
        let (users, posts) = stores(&[ada.clone()]).await;
        let svc = service(posts.clone(), users);

        for draft in [
            PostDraft::new("", "body", None),
            PostDraft::new("title", "  ", None),
        ] {
            assert!(matches!(
                svc.submit(ada.id(), draft).await,
                Err(DomainError::Validation { .. })
            ));
        }

        assert!(posts.find(&PostFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_verified_author() {
        let bob = unverified_user("bob");
        let (users, posts) = stores(&[bob.clone()]).await;
        let svc = service(posts.clone(), users);

        assert!(matches!(
            svc.submit(bob.id(), PostDraft::new("T", "C", None)).await,
            Err(DomainError::Unverified { .. })
        ));
        assert!(posts.find(&PostFilter::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_for_unknown_user_is_unauthenticated() {
        let (users, posts) = stores(&[]).await;
        let svc = service(posts, users);

        assert!(matches!(
            svc.submit(&UserId::new("ghost").unwrap(), PostDraft::new("T", "C", None))
                .await,
            Err(DomainError::Unauthenticated { .. })
        ));
    }

    #[tokio::test]
    async fn test_mirror_failure_is_partial_write() {
        let ada = verified_user("ada");
        let stored = ada.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        users
            .expect_push_post()
            .times(1)
            .returning(|_, _| Err(DomainError::storage("connection reset")));

        let posts = Arc::new(crate::infrastructure::post::InMemoryPostRepository::new());
        let svc = service(posts.clone(), Arc::new(users));

        let err = svc
            .submit(ada.id(), PostDraft::new("T", "C", None))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::PartialWrite { .. }));
        // authoritative record stays for manual reconciliation
        assert_eq!(posts.find(&PostFilter::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_store_failure_skips_mirror() {
        let ada = verified_user("ada");
        let stored = ada.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        users.expect_push_post().never();

        let mut posts = MockPostRepository::new();
        posts
            .expect_create()
            .returning(|_| Err(DomainError::storage("disk full")));

        let svc = service(Arc::new(posts), Arc::new(users));

        assert!(matches!(
            svc.submit(ada.id(), PostDraft::new("T", "C", None)).await,
            Err(DomainError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn test_author_can_delete_own_post() {
        let ada = verified_user("ada");
        let (users, posts) = stores(&[ada.clone()]).await;
        let post = seed_post(&users, &posts, post_by(&ada, "p1", "Mine")).await;
        let svc = service(posts.clone(), users.clone());

        svc.delete(ada.id(), post.id()).await.unwrap();

        assert!(posts.get(post.id()).await.unwrap().is_none());
        assert!(users.get(ada.id()).await.unwrap().unwrap().posts().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_post_is_not_found() {
        let ada = verified_user("ada");
        let (users, posts) = stores(&[ada.clone()]).await;
        let svc = service(posts, users);

        assert!(matches!(
            svc.delete(ada.id(), &PostId::new("missing").unwrap()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mirror_pull_failure_still_deletes_record() {
        let ada = verified_user("ada");
        let post = post_by(&ada, "p1", "Mine");
        let stored = ada.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        users
            .expect_pull_post()
            .times(1)
            .returning(|_, _| Err(DomainError::storage("timeout")));

        let posts = Arc::new(crate::infrastructure::post::InMemoryPostRepository::new());
        posts.create(post.clone()).await.unwrap();

        let svc = service(posts.clone(), Arc::new(users));

        assert!(matches!(
            svc.delete(ada.id(), post.id()).await,
            Err(DomainError::PartialWrite { .. })
        ));
        assert!(posts.get(post.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_delete_failure_still_pulls_mirror() {
        let ada = verified_user("ada");
        let post = post_by(&ada, "p1", "Mine");
        let stored = ada.clone();
        let found = post.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        users
            .expect_pull_post()
            .times(1)
            .returning(|_, _| Ok(true));

        let mut posts = MockPostRepository::new();
        posts
            .expect_get()
            .returning(move |_| Ok(Some(found.clone())));
        posts
            .expect_delete()
            .times(1)
            .returning(|_| Err(DomainError::storage("lock timeout")));

        let svc = service(Arc::new(posts), Arc::new(users));

        assert!(matches!(
            svc.delete(ada.id(), post.id()).await,
            Err(DomainError::PartialWrite { .. })
        ));
    }
}
