//! Blog endpoints: feed, search, posts, likes, profiles and the contact form

pub mod contact;
pub mod feed;
pub mod posts;
pub mod profile;

use axum::{
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::state::AppState;
use crate::domain::{Message, Post};

/// Create the blog router
pub fn create_blog_router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::home))
        .route("/search", get(feed::search))
        .route("/posts/{post_id}", get(posts::get_post))
        .route("/compose", post(posts::compose))
        .route("/like", post(posts::set_liked))
        .route("/delete", post(posts::delete_post))
        .route("/profile", get(profile::own_profile))
        .route("/profile/{user_id}", get(profile::get_profile))
        .route("/contact", post(contact::submit))
}

/// Public view of a post
///
/// The readable body is `html`, which is the sanitized rendering. The author's
/// login email and the markdown source stay server-side.
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub html: String,
    pub author_id: String,
    pub author_handle: String,
    pub created_at: String,
    pub like_count: u64,
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id().to_string(),
            title: post.title().to_string(),
            content: post.content().to_string(),
            html: post.sanitized_html().to_string(),
            author_id: post.author_id().to_string(),
            author_handle: post.author_handle().to_string(),
            created_at: post.created_at().to_rfc3339(),
            like_count: post.like_count(),
        }
    }
}

pub(crate) fn post_list(posts: &[Post]) -> Vec<PostResponse> {
    posts.iter().map(PostResponse::from).collect()
}

/// Acknowledgement with a hint where the client should go next
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}
