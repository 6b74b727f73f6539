//! Database operations for the Rolodex `SQLite` store.
//!
//! ## Tables
//!
//! - `customers` - Customer identity, name and unique phone number
//! - `addresses` - Postal addresses, each owned by one customer
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/`, embedded in the
//! binary, and applied on server start. They can also be applied to a file
//! database ahead of time:
//! ```bash
//! cargo run -p rolodex-cli -- migrate
//! ```
//!
//! # Durability
//!
//! The default database URL is `sqlite::memory:`, which lives exactly as long
//! as the process. Point `ROLODEX_DATABASE_URL` at a file to keep data across
//! restarts.

pub mod addresses;
pub mod customers;
pub mod query;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use addresses::{AddressFilter, AddressRepository, AddressSort};
pub use customers::{CustomerFilter, CustomerRepository, CustomerSort};
pub use query::{Filter, PaginatedQuery, Sort, Sortable};

/// Schema migrations embedded from `crates/server/migrations/`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate phone number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Whether a `SQLite` URL names a private in-memory database.
#[must_use]
pub fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create a `SQLite` connection pool.
///
/// An in-memory database exists only while a connection to it is open, so
/// in-memory pools hold exactly one connection that never expires. File
/// databases use WAL journaling and up to `max_connections` connections.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the database cannot be opened.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if is_in_memory(database_url) {
        return SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await;
    }

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options.journal_mode(SqliteJournalMode::Wal))
        .await
}

/// Apply any pending schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history
/// disagrees with the embedded migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Open a fresh, migrated in-memory database.
///
/// # Errors
///
/// Returns an error if the pool cannot be created or migrations fail.
pub async fn in_memory() -> Result<SqlitePool, MigrateError> {
    let pool = create_pool("sqlite::memory:", 1).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
