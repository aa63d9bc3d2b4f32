//! Pooled connections for the configured backend.
//!
//! Exactly one of the `sqlite` or `postgres` features selects the connection
//! type, the embedded migration set and the pool alias used by the rest of the
//! crate.

use cfg_if::cfg_if;
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, PoolError, bb8::Pool};
#[cfg(feature = "sqlite")]
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

cfg_if! {
    if #[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))] {
        compile_error!("Either feature 'sqlite' or 'postgres' must be enabled, not both");
    } else if #[cfg(feature = "sqlite")] {
        use diesel::sqlite::{Sqlite, SqliteConnection};
        /// Backend marker for `SQLite`.
        pub type Backend = Sqlite;
        /// Migrations under `migrations/sqlite`.
        pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");
        /// `SQLite` connection driven on the blocking pool.
        pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;
        /// Pool of `SQLite` connections.
        pub type DbPool = Pool<DbConnection>;
    } else if #[cfg(all(feature = "postgres", not(feature = "sqlite")))] {
        use diesel::pg::Pg;
        use diesel_async::AsyncPgConnection;
        /// Backend marker for PostgreSQL.
        pub type Backend = Pg;
        /// Migrations under `migrations/postgres`.
        pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/postgres");
        /// Native async PostgreSQL connection.
        pub type DbConnection = AsyncPgConnection;
        /// Pool of PostgreSQL connections.
        pub type DbPool = Pool<DbConnection>;
    } else {
        compile_error!("Either feature 'sqlite' or 'postgres' must be enabled");
    }
}

/// Milliseconds a pooled `SQLite` connection waits on a locked database.
#[cfg(feature = "sqlite")]
pub const SQLITE_BUSY_TIMEOUT_MS: u32 = 5_000;

/// Open a `SQLite` connection that retries on lock contention.
///
/// Pooled connections share one database file, so concurrent writers would
/// otherwise fail immediately with `SQLITE_BUSY`.
#[cfg(feature = "sqlite")]
fn sqlite_setup(
    url: &str,
) -> futures_util::future::BoxFuture<'_, diesel::ConnectionResult<DbConnection>> {
    use diesel::ConnectionError;
    use diesel_async::{AsyncConnection, RunQueryDsl};
    use futures_util::FutureExt;

    async move {
        let mut conn = DbConnection::establish(url).await?;
        diesel::sql_query(format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
            .execute(&mut conn)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    }
    .boxed()
}

/// Build a connection pool for `database_url`.
///
/// # Examples
///
/// ```no_run
/// use lista::db::establish_pool;
/// async fn example() {
///     let pool = establish_pool("lista.db")
///         .await
///         .expect("failed to build pool");
/// }
/// ```
///
/// # Errors
/// Returns any error reported by the underlying connection pool builder.
pub async fn establish_pool(database_url: &str) -> Result<DbPool, PoolError> {
    #[cfg(feature = "sqlite")]
    let manager = {
        use diesel_async::pooled_connection::ManagerConfig;

        let mut config = ManagerConfig::default();
        config.custom_setup = Box::new(sqlite_setup);
        AsyncDieselConnectionManager::<DbConnection>::new_with_config(database_url, config)
    };
    #[cfg(not(feature = "sqlite"))]
    let manager = AsyncDieselConnectionManager::<DbConnection>::new(database_url);
    Pool::builder().build(manager).await
}
