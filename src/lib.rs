//! Bloggy
//!
//! A small blogging service: accounts with email verification, markdown posts
//! rendered to sanitized HTML, likes, profiles and role-based moderation.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use api::{AppState, Backends};
use config::StorageBackend;
use domain::trending::TrendingFeed;
use infrastructure::{
    notification::build_notifier,
    post::{InMemoryPostRepository, PostgresPostRepository},
    storage::{connect_pool, PostgresConfig},
    trending::{DevToTrendingClient, NoTrending},
    user::{InMemoryUserRepository, PostgresUserRepository},
};

/// Open the PostgreSQL pool described by the storage section
pub async fn connect_database(config: &AppConfig) -> anyhow::Result<PgPool> {
    if config.storage.database_url.is_empty() {
        anyhow::bail!("storage.database_url is required for the postgres backend");
    }

    let pool = connect_pool(
        &PostgresConfig::new(config.storage.database_url.clone())
            .with_max_connections(config.storage.max_connections),
    )
    .await?;

    Ok(pool)
}

/// Build the stores and outbound adapters selected by the configuration
pub async fn create_backends(config: &AppConfig) -> anyhow::Result<Backends> {
    info!(backend = ?config.storage.backend, "Storage backend");

    let (users, posts): (
        Arc<dyn domain::UserRepository>,
        Arc<dyn domain::PostRepository>,
    ) = match config.storage.backend {
        StorageBackend::Memory => (
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
        ),
        StorageBackend::Postgres => {
            let pool = connect_database(config).await?;
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresPostRepository::new(pool)),
            )
        }
    };

    let trending: Arc<dyn TrendingFeed> = if config.trending.enabled {
        Arc::new(DevToTrendingClient::new(config.trending.clone())?)
    } else {
        Arc::new(NoTrending)
    };

    Ok(Backends {
        users,
        posts,
        notifier: build_notifier(&config.mail)?,
        trending,
    })
}

/// Create the application state with the default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let backends = create_backends(config).await?;
    Ok(AppState::new(backends, config))
}
