//! Post domain

mod entity;
mod filter;
mod renderer;
mod repository;

pub use entity::{sort_newest_first, Post, PostDraft, PostId};
pub use filter::{PostFilter, SearchTerm};
pub use renderer::MarkdownRenderer;
pub use repository::PostRepository;

#[cfg(test)]
pub use repository::MockPostRepository;
