//! Post entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::renderer::MarkdownRenderer;
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

const MAX_POST_ID_LENGTH: usize = 64;
const MAX_TITLE_LENGTH: usize = 200;

/// Post identifier, assigned by the submission pipeline
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.is_empty() {
            return Err(DomainError::invalid_id("Post ID cannot be empty"));
        }

        if id.len() > MAX_POST_ID_LENGTH {
            return Err(DomainError::invalid_id(format!(
                "Post ID exceeds maximum length of {} characters",
                MAX_POST_ID_LENGTH
            )));
        }

        if let Some(c) = id.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
            return Err(DomainError::invalid_id(format!(
                "Post ID contains invalid character: '{}'",
                c
            )));
        }

        Ok(Self(id))
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PostId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        id.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Author input for a new post. Author identity is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub markdown: Option<String>,
}

impl PostDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        markdown: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            markdown,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("Title is required."));
        }

        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Title exceeds maximum length of {} characters.",
                MAX_TITLE_LENGTH
            )));
        }

        if self.content.trim().is_empty() {
            return Err(DomainError::validation("Content is required."));
        }

        Ok(())
    }
}

/// A published post
///
/// `sanitized_html` has no setter: it is derived from `markdown_source` when
/// the post is composed and is the empty string when there is no markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    id: PostId,
    title: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    markdown_source: Option<String>,
    sanitized_html: String,
    author_handle: String,
    author_email: String,
    author_id: UserId,
    created_at: DateTime<Utc>,
    like_count: u64,
}

impl Post {
    /// Build a post from a validated draft and the author's current record
    pub fn compose(
        id: PostId,
        draft: PostDraft,
        author: &User,
        renderer: &dyn MarkdownRenderer,
    ) -> Self {
        let markdown_source = draft.markdown.filter(|m| !m.trim().is_empty());
        let sanitized_html = markdown_source
            .as_deref()
            .map(|m| renderer.render(m))
            .unwrap_or_default();

        Self {
            id,
            title: draft.title.trim().to_string(),
            content: draft.content,
            markdown_source,
            sanitized_html,
            author_handle: author.display_handle().to_string(),
            author_email: author.login_email().to_string(),
            author_id: author.id().clone(),
            created_at: Utc::now(),
            like_count: 0,
        }
    }

    /// Restore a post from persisted columns
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore(
        id: PostId,
        title: String,
        content: String,
        markdown_source: Option<String>,
        sanitized_html: String,
        author_handle: String,
        author_email: String,
        author_id: UserId,
        created_at: DateTime<Utc>,
        like_count: u64,
    ) -> Self {
        Self {
            id,
            title,
            content,
            markdown_source,
            sanitized_html,
            author_handle,
            author_email,
            author_id,
            created_at,
            like_count,
        }
    }

    // Getters

    pub fn id(&self) -> &PostId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn markdown_source(&self) -> Option<&str> {
        self.markdown_source.as_deref()
    }

    pub fn sanitized_html(&self) -> &str {
        &self.sanitized_html
    }

    pub fn author_handle(&self) -> &str {
        &self.author_handle
    }

    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    /// Apply a signed adjustment, never dropping below zero
    pub fn adjust_likes(&mut self, delta: i64) {
        self.like_count = if delta.is_negative() {
            self.like_count.saturating_sub(delta.unsigned_abs())
        } else {
            self.like_count.saturating_add(delta as u64)
        };
    }

    pub fn set_like_count(&mut self, count: u64) {
        self.like_count = count;
    }
}

/// Newest first; ties broken by id so the order is stable
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
