//! CLI subcommands.

pub mod migrate;
pub mod seed;

use sqlx::SqlitePool;

use rolodex_server::config::{ConfigError, ServerConfig};
use rolodex_server::db::{self, RepositoryError};

/// Errors a command can fail with.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid seed data: {0}")]
    Validation(#[from] rolodex_core::ValidationError),
}

/// Open the configured database.
async fn connect() -> Result<SqlitePool, CommandError> {
    let config = ServerConfig::from_env()?;
    if db::is_in_memory(&config.database_url) {
        tracing::warn!(
            "ROLODEX_DATABASE_URL is unset or in-memory; changes are lost when this command exits"
        );
    }

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    Ok(pool)
}
