//! Migrate command - manages the PostgreSQL schema

use clap::{Args, Subcommand};
use tracing::info;

use crate::infrastructure::storage::{Migrator, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Defaults to `up`
    #[command(subcommand)]
    pub action: Option<MigrateAction>,
}

#[derive(Debug, Subcommand)]
pub enum MigrateAction {
    /// Apply every pending migration
    Up,
    /// Revert the most recently applied migration
    Revert,
    /// Print the current schema version
    Status,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let pool = crate::connect_database(&config).await?;
    let migrator = PostgresMigrator::new(pool);

    match args.action.unwrap_or(MigrateAction::Up) {
        MigrateAction::Up => {
            migrator.run().await?;
            info!(version = ?migrator.version().await?, "Schema up to date");
        }
        MigrateAction::Revert => {
            migrator.revert().await?;
            info!(version = ?migrator.version().await?, "Reverted one migration");
        }
        MigrateAction::Status => match migrator.version().await? {
            Some(version) => println!("schema version {}", version),
            None => println!("no migrations applied"),
        },
    }

    Ok(())
}
