//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ROLODEX_DATABASE_URL=sqlite://rolodex.db rolodex-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded in both
//! binaries; the server also applies them on start.

use super::{CommandError, connect};

/// Apply pending migrations to the configured database.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    rolodex_server::db::run_migrations(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
