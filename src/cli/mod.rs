//! CLI module for Bloggy
//!
//! - `serve`: run the HTTP server
//! - `migrate`: manage the PostgreSQL schema
//! - `reconcile-likes`: recompute like counters from users' liked sets

pub mod migrate;
pub mod reconcile;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Bloggy - markdown blogging with likes and moderation
#[derive(Parser)]
#[command(name = "bloggy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply, revert or inspect database migrations
    Migrate(migrate::MigrateArgs),

    /// Recompute every post's like counter from users' liked sets
    ReconcileLikes,
}

/// Read `.env` and the layered configuration, then install logging
pub fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}
