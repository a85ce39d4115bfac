//! Application services

mod contact_service;
mod feed_service;
mod like_service;
mod submission_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use contact_service::{ContactForm, ContactService};
pub use feed_service::{FeedService, HomeFeed, PostView, ProfileView, SearchResults};
pub use like_service::{LikeOutcome, LikeService, ReconcileReport};
pub use submission_service::SubmissionService;
