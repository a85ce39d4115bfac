//! Post lookup predicates

use regex::{Regex, RegexBuilder};

use super::entity::Post;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// A literal, case-insensitive search term
#[derive(Debug, Clone)]
pub struct SearchTerm {
    raw: String,
    pattern: Regex,
}

impl SearchTerm {
    pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into().trim().to_string();

        if raw.is_empty() {
            return Err(DomainError::validation("Search query cannot be empty."));
        }

        let pattern = RegexBuilder::new(&regex::escape(&raw))
            .case_insensitive(true)
            .build()
            .map_err(|e| DomainError::validation(format!("Invalid search query: {}", e)))?;

        Ok(Self { raw, pattern })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Which posts a lookup should return
#[derive(Debug, Clone)]
pub enum PostFilter {
    All,
    /// Title or content contains the term
    Search(SearchTerm),
    Author(UserId),
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            Self::All => true,
            Self::Search(term) => term.is_match(post.title()) || term.is_match(post.content()),
            Self::Author(id) => post.author_id() == id,
        }
    }
}
