//! Application state for shared services

use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::notification::Notifier;
use crate::domain::post::PostRepository;
use crate::domain::trending::TrendingFeed;
use crate::domain::user::UserRepository;
use crate::infrastructure::auth::{JwtConfig, JwtService};
use crate::infrastructure::markdown::MarkdownHtmlRenderer;
use crate::infrastructure::services::{ContactService, FeedService, LikeService, SubmissionService};
use crate::infrastructure::user::{AccountService, AccountSettings, Argon2Hasher};

/// Stores and outbound adapters the services are wired over
#[derive(Clone)]
pub struct Backends {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub notifier: Arc<dyn Notifier>,
    pub trending: Arc<dyn TrendingFeed>,
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub submissions: Arc<SubmissionService>,
    pub likes: Arc<LikeService>,
    pub feed: Arc<FeedService>,
    pub contact: Arc<ContactService>,
}

impl AppState {
    pub fn new(backends: Backends, config: &AppConfig) -> Self {
        let Backends {
            users,
            posts,
            notifier,
            trending,
        } = backends;

        let sessions = Arc::new(JwtService::new(JwtConfig::new(
            config.session.secret.clone(),
            config.session.expiration_hours,
        )));

        let accounts = AccountService::new(
            users.clone(),
            Arc::new(Argon2Hasher::new()),
            sessions,
            notifier.clone(),
            AccountSettings {
                public_url: config.server.public_url.clone(),
                token_ttl_minutes: config.verification.token_ttl_minutes,
            },
        );

        Self {
            accounts: Arc::new(accounts),
            submissions: Arc::new(SubmissionService::new(
                posts.clone(),
                users.clone(),
                Arc::new(MarkdownHtmlRenderer::new()),
            )),
            likes: Arc::new(LikeService::new(posts.clone(), users.clone())),
            feed: Arc::new(FeedService::new(posts, users, trending)),
            contact: Arc::new(ContactService::new(
                notifier,
                config.mail.admin_address.clone(),
            )),
        }
    }
}
