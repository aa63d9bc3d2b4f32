//! Embedded migration utilities.

use std::{error::Error as StdError, time::Duration};

use diesel::result::{Error as DieselError, QueryResult};
use diesel_migrations::MigrationHarness;
use thiserror::Error;
use tokio::time::timeout;
use tracing::info;

use super::connection::{DbConnection, MIGRATIONS};

const MIGRATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Failures raised outside Diesel's own error type while migrating.
///
/// These are folded into [`DieselError::SerializationError`] so callers only
/// handle a single `QueryResult`.
#[derive(Debug, Error)]
enum MigrationFailure {
    #[error("migration harness error: {0}")]
    Harness(Box<dyn StdError + Send + Sync>),
    #[error("migration execution exceeded {0:?}")]
    Timeout(Duration),
    #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
    #[error("migration executor error: {0}")]
    Executor(#[from] tokio::task::JoinError),
    #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
    #[error("migration connection error: {0}")]
    Connection(#[from] diesel::result::ConnectionError),
}

impl From<MigrationFailure> for DieselError {
    fn from(value: MigrationFailure) -> Self { Self::SerializationError(Box::new(value)) }
}

fn apply_pending<C>(conn: &mut C) -> QueryResult<()>
where
    C: MigrationHarness<super::connection::Backend>,
{
    if let Ok(false) = conn.has_pending_migration(MIGRATIONS) {
        info!("no pending migrations; skipping apply");
        return Ok(());
    }
    info!("applying pending migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map(|versions| info!(applied = versions.len(), "migrations applied"))
        .map_err(|e| MigrationFailure::Harness(e).into())
}

/// Run embedded database migrations on an open connection.
///
/// # Errors
/// Returns any error produced by Diesel while running migrations, or a
/// serialisation error wrapping a timeout.
#[cfg(feature = "sqlite")]
#[must_use = "handle the result"]
pub async fn run_migrations(conn: &mut DbConnection) -> QueryResult<()> {
    timeout(MIGRATION_TIMEOUT, conn.spawn_blocking(apply_pending))
        .await
        .map_err(|_| MigrationFailure::Timeout(MIGRATION_TIMEOUT))??;
    Ok(())
}

/// Run embedded database migrations against `database_url`.
///
/// `diesel_migrations` needs a synchronous connection, so a dedicated one is
/// opened on the blocking pool.
///
/// # Errors
/// Returns any error produced by Diesel while running migrations.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
#[must_use = "handle the result"]
pub async fn run_migrations(database_url: &str) -> QueryResult<()> {
    use diesel::{Connection, pg::PgConnection};

    let url = database_url.to_owned();
    let task = tokio::task::spawn_blocking(move || -> QueryResult<()> {
        let mut conn = PgConnection::establish(&url).map_err(MigrationFailure::from)?;
        apply_pending(&mut conn)
    });
    timeout(MIGRATION_TIMEOUT, task)
        .await
        .map_err(|_| MigrationFailure::Timeout(MIGRATION_TIMEOUT))?
        .map_err(MigrationFailure::from)??;
    Ok(())
}

/// Apply embedded migrations for the current backend.
///
/// # Errors
/// Returns any error produced by Diesel while running migrations.
#[cfg(feature = "sqlite")]
#[must_use = "handle the result"]
pub async fn apply_migrations(conn: &mut DbConnection, _database_url: &str) -> QueryResult<()> {
    run_migrations(conn).await
}

/// Apply embedded migrations for the current backend.
///
/// # Errors
/// Returns any error produced by Diesel while running migrations.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
#[must_use = "handle the result"]
pub async fn apply_migrations(conn: &mut DbConnection, url: &str) -> QueryResult<()> {
    let _ = conn;
    run_migrations(url).await
}
