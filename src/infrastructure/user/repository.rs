//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::post::{Post, PostId};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<String, User>,
    /// login email -> user ID
    email_index: HashMap<String, String>,
    /// display handle -> user ID
    handle_index: HashMap<String, String>,
}

impl UserTable {
    fn get_mut(&mut self, id: &UserId) -> Result<&mut User, DomainError> {
        self.users
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}

/// In-memory implementation of UserRepository
///
/// Every primitive runs under one write lock, so membership checks and their
/// mutation are a single step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn get_by_handle(&self, handle: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .handle_index
            .get(handle)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .users
            .values()
            .find(|u| u.external_identity_id() == Some(external_id))
            .cloned())
    }

    async fn find_by_verification_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .users
            .values()
            .find(|u| u.verification().is_some_and(|v| v.accepts(token, now)))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let id = user.id().as_str().to_string();

        if table.users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if table.email_index.contains_key(user.login_email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.login_email()
            )));
        }

        if table.handle_index.contains_key(user.display_handle()) {
            return Err(DomainError::conflict(format!(
                "Handle '{}' already exists",
                user.display_handle()
            )));
        }

        if let Some(external_id) = user.external_identity_id() {
            if table
                .users
                .values()
                .any(|u| u.external_identity_id() == Some(external_id))
            {
                return Err(DomainError::conflict(format!(
                    "External identity '{}' already linked",
                    external_id
                )));
            }
        }

        table
            .email_index
            .insert(user.login_email().to_string(), id.clone());
        table
            .handle_index
            .insert(user.display_handle().to_string(), id.clone());
        table.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;
        let id = user.id().as_str().to_string();

        let stored = table
            .users
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        let old_email = stored.login_email().to_string();
        let old_handle = stored.display_handle().to_string();

        if old_email != user.login_email() && table.email_index.contains_key(user.login_email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                user.login_email()
            )));
        }

        if old_handle != user.display_handle()
            && table.handle_index.contains_key(user.display_handle())
        {
            return Err(DomainError::conflict(format!(
                "Handle '{}' already exists",
                user.display_handle()
            )));
        }

        // liked set and mirrored posts stay as stored
        let merged = User::restore(
            user.id().clone(),
            user.login_email().to_string(),
            user.credential_hash().map(str::to_string),
            user.external_identity_id().map(str::to_string),
            user.display_handle().to_string(),
            stored.posts().to_vec(),
            stored.liked_post_ids().clone(),
            user.is_verified(),
            user.verification().cloned(),
            user.role(),
            stored.created_at(),
            user.updated_at(),
        );

        table.email_index.remove(&old_email);
        table.handle_index.remove(&old_handle);
        table
            .email_index
            .insert(merged.login_email().to_string(), id.clone());
        table
            .handle_index
            .insert(merged.display_handle().to_string(), id.clone());
        table.users.insert(id, merged.clone());

        Ok(merged)
    }

    async fn add_liked_post(&self, id: &UserId, post_id: &PostId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.get_mut(id)?.like(post_id.clone()))
    }

    async fn remove_liked_post(
        &self,
        id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.get_mut(id)?.unlike(post_id))
    }

    async fn push_post(&self, id: &UserId, post: &Post) -> Result<(), DomainError> {
        let mut table = self.table.write().await;
        table.get_mut(id)?.push_post(post.clone());
        Ok(())
    }

    async fn pull_post(&self, id: &UserId, post_id: &PostId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.get_mut(id)?.pull_post(post_id))
    }

    async fn count_likers(&self, post_id: &PostId) -> Result<u64, DomainError> {
        let table = self.table.read().await;
        Ok(table
            .users
            .values()
            .filter(|u| u.has_liked(post_id))
            .count() as u64)
    }

    async fn prune_liked_posts(&self, existing: &[PostId]) -> Result<u64, DomainError> {
        let existing: HashSet<&PostId> = existing.iter().collect();
        let mut table = self.table.write().await;

        Ok(table
            .users
            .values_mut()
            .map(|u| u.retain_liked(|id| existing.contains(id)))
            .filter(|dropped| *dropped > 0)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::post::{MarkdownRenderer, PostDraft};
    use crate::domain::user::{Role, Verification};
    use chrono::Duration;

    struct PlainRenderer;

    impl MarkdownRenderer for PlainRenderer {
        fn render(&self, markdown: &str) -> String {
            markdown.to_string()
        }
    }

    fn create_test_user(id: &str, email: &str, handle: &str) -> User {
        User::new_local(
            UserId::new(id).unwrap(),
            email,
            handle,
            "hash",
            Verification::new(format!("token-{}", id), Utc::now() + Duration::hours(1)),
        )
    }

    fn post_by(user: &User, id: &str) -> Post {
        Post::compose(
            PostId::new(id).unwrap(),
            PostDraft::new("Title", "Body", None),
            user,
            &PlainRenderer,
        )
    }

    #[tokio::test]
    async fn test_create_and_lookup() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "ada@example.com", "ada");
        repo.create(user).await.unwrap();

        let id = UserId::new("user-1").unwrap();
        assert!(repo.get(&id).await.unwrap().is_some());
        assert!(repo.get_by_email("ada@example.com").await.unwrap().is_some());
        assert!(repo.get_by_handle("ada").await.unwrap().is_some());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "ada@example.com", "ada"))
            .await
            .unwrap();

        let same_email = create_test_user("user-2", "ada@example.com", "other");
        assert!(matches!(
            repo.create(same_email).await,
            Err(DomainError::Conflict { .. })
        ));

        let same_handle = create_test_user("user-3", "other@example.com", "ada");
        assert!(matches!(
            repo.create(same_handle).await,
            Err(DomainError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_verification_token_lookup_respects_expiry() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "ada@example.com", "ada"))
            .await
            .unwrap();

        let now = Utc::now();
        assert!(repo
            .find_by_verification_token("token-user-1", now)
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_verification_token("token-user-1", now + Duration::hours(2))
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_verification_token("wrong", now)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_likes_and_mirror() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(create_test_user("user-1", "ada@example.com", "ada"))
            .await
            .unwrap();

        let post_id = PostId::new("post-1").unwrap();
        repo.add_liked_post(user.id(), &post_id).await.unwrap();
        repo.push_post(user.id(), &post_by(&user, "post-1"))
            .await
            .unwrap();

        // stale copy without the like or the post
        let mut stale = user.clone();
        stale.mark_verified();
        stale.set_role(Role::Admin);
        let updated = repo.update(&stale).await.unwrap();

        assert!(updated.is_verified());
        assert_eq!(updated.role(), Role::Admin);
        assert!(updated.has_liked(&post_id));
        assert_eq!(updated.posts().len(), 1);
    }

    #[tokio::test]
    async fn test_liked_set_primitives_report_membership_changes() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(create_test_user("user-1", "ada@example.com", "ada"))
            .await
            .unwrap();
        let post_id = PostId::new("post-1").unwrap();

        assert!(repo.add_liked_post(user.id(), &post_id).await.unwrap());
        assert!(!repo.add_liked_post(user.id(), &post_id).await.unwrap());
        assert_eq!(repo.count_likers(&post_id).await.unwrap(), 1);

        assert!(repo.remove_liked_post(user.id(), &post_id).await.unwrap());
        assert!(!repo.remove_liked_post(user.id(), &post_id).await.unwrap());
        assert_eq!(repo.count_likers(&post_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prune_drops_ids_of_missing_posts() {
        let repo = InMemoryUserRepository::new();
        let ada = repo
            .create(create_test_user("user-1", "ada@example.com", "ada"))
            .await
            .unwrap();
        let bob = repo
            .create(create_test_user("user-2", "bob@example.com", "bob"))
            .await
            .unwrap();
        let live = PostId::new("live").unwrap();
        let deleted = PostId::new("deleted").unwrap();

        repo.add_liked_post(ada.id(), &live).await.unwrap();
        repo.add_liked_post(ada.id(), &deleted).await.unwrap();
        repo.add_liked_post(bob.id(), &live).await.unwrap();

        assert_eq!(repo.prune_liked_posts(&[live.clone()]).await.unwrap(), 1);
        assert_eq!(repo.count_likers(&deleted).await.unwrap(), 0);
        assert_eq!(repo.count_likers(&live).await.unwrap(), 2);
        assert_eq!(repo.prune_liked_posts(&[live]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_primitives_on_missing_user_are_not_found() {
        let repo = InMemoryUserRepository::new();
        let ghost = UserId::new("ghost").unwrap();
        let post_id = PostId::new("post-1").unwrap();

        assert!(matches!(
            repo.add_liked_post(&ghost, &post_id).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            repo.pull_post(&ghost, &post_id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_mirror_push_and_pull() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(create_test_user("user-1", "ada@example.com", "ada"))
            .await
            .unwrap();

        repo.push_post(user.id(), &post_by(&user, "post-1"))
            .await
            .unwrap();
        repo.push_post(user.id(), &post_by(&user, "post-2"))
            .await
            .unwrap();

        let post_id = PostId::new("post-1").unwrap();
        assert!(repo.pull_post(user.id(), &post_id).await.unwrap());
        assert!(!repo.pull_post(user.id(), &post_id).await.unwrap());

        let stored = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(stored.posts().len(), 1);
        assert_eq!(stored.posts()[0].id().as_str(), "post-2");
    }
}
