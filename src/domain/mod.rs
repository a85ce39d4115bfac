//! Domain layer: entities, validation, repository traits and access rules

pub mod access;
pub mod error;
pub mod message;
pub mod notification;
pub mod post;
pub mod trending;
pub mod user;

pub use access::can_delete;
pub use error::DomainError;
pub use message::{Message, MessageType};
pub use notification::{EmailMessage, Notifier};
pub use post::{Post, PostDraft, PostFilter, PostId, PostRepository, SearchTerm};
pub use trending::{TrendingArticle, TrendingFeed};
pub use user::{ExternalProfile, Role, User, UserId, UserRepository};
