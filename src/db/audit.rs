//! Backend feature audits ensure required DB capabilities are available.

use diesel::{
    QueryableByName,
    result::{Error as DieselError, QueryResult},
    sql_query,
    sql_types::Text,
};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;

#[derive(QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = Text)]
    version: String,
}

fn unsupported(message: String) -> DieselError {
    DieselError::QueryBuilderError(Box::new(std::io::Error::other(message)))
}

/// Parse the leading `major.minor` pair from a version string.
fn major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()
        .map_or(Some(0), |m| m.split(|c: char| !c.is_ascii_digit()).next()?.parse().ok())?;
    Some((major, minor))
}

/// Verify that `SQLite` supports the `RETURNING` clause (3.35 or newer).
///
/// Every insert and update helper relies on `RETURNING` to hand back the
/// stored row.
///
/// # Errors
/// Returns any error produced by the version query, or an error when the
/// library is too old.
#[cfg(feature = "sqlite")]
#[must_use = "handle the result"]
pub async fn audit_sqlite_features(conn: &mut DbConnection) -> QueryResult<()> {
    let row: VersionRow = sql_query("SELECT sqlite_version() AS version")
        .get_result(conn)
        .await?;
    match major_minor(&row.version) {
        Some(found) if found >= (3, 35) => Ok(()),
        Some(_) => Err(unsupported(format!(
            "sqlite {} lacks RETURNING support (require >= 3.35)",
            row.version
        ))),
        None => Err(unsupported(format!(
            "unable to parse sqlite version: {}",
            row.version
        ))),
    }
}

/// Verify that the Postgres server is version 14 or newer.
///
/// # Errors
/// Returns any error produced by the version query or if the version string
/// cannot be parsed.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
#[must_use = "handle the result"]
pub async fn audit_postgres_features(conn: &mut DbConnection) -> QueryResult<()> {
    let row: VersionRow = sql_query("SELECT current_setting('server_version') AS version")
        .get_result(conn)
        .await?;
    let Some((major, _)) = major_minor(&row.version) else {
        return Err(unsupported(format!(
            "unable to parse postgres version: {}",
            row.version
        )));
    };
    if major < 14 {
        return Err(unsupported(format!(
            "postgres version {major} is not supported (require >= 14)"
        )));
    }
    Ok(())
}
