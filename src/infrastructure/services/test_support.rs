//! Fixtures shared by the service tests

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::post::{MarkdownRenderer, Post, PostDraft, PostId, PostRepository};
use crate::domain::user::{Role, User, UserId, UserRepository, Verification};
use crate::infrastructure::post::InMemoryPostRepository;
use crate::infrastructure::user::InMemoryUserRepository;

pub struct PlainRenderer;

impl MarkdownRenderer for PlainRenderer {
    fn render(&self, markdown: &str) -> String {
        format!("<p>{}</p>", markdown)
    }
}

pub fn unverified_user(id: &str) -> User {
    User::new_local(
        UserId::new(id).unwrap(),
        format!("{}@example.com", id),
        id,
        "hash",
        Verification::new(format!("token-{}", id), Utc::now() + Duration::hours(1)),
    )
}

pub fn verified_user(id: &str) -> User {
    let mut user = unverified_user(id);
    user.mark_verified();
    user
}

pub fn admin_user(id: &str) -> User {
    let mut user = verified_user(id);
    user.set_role(Role::Admin);
    user
}

pub fn post_by(user: &User, id: &str, title: &str) -> Post {
    Post::compose(
        PostId::new(id).unwrap(),
        PostDraft::new(title, "content", None),
        user,
        &PlainRenderer,
    )
}

/// In-memory stores seeded with the given users
pub async fn stores(
    users: &[User],
) -> (Arc<InMemoryUserRepository>, Arc<InMemoryPostRepository>) {
    let user_repo = Arc::new(InMemoryUserRepository::new());

    for user in users {
        user_repo.create(user.clone()).await.unwrap();
    }

    (user_repo, Arc::new(InMemoryPostRepository::new()))
}

/// Store a post authoritatively and in its author's mirror
pub async fn seed_post(
    users: &InMemoryUserRepository,
    posts: &InMemoryPostRepository,
    post: Post,
) -> Post {
    let post = posts.create(post).await.unwrap();
    users.push_post(post.author_id(), &post).await.unwrap();
    post
}
