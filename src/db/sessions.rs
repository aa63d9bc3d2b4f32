//! Bearer session storage.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{NewSession, User};

/// Persist a freshly issued session.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_session(conn: &mut DbConnection, session: &NewSession<'_>) -> QueryResult<usize> {
    use crate::schema::sessions::dsl::sessions;
    diesel::insert_into(sessions)
        .values(session)
        .execute(conn)
        .await
}

/// Resolve a bearer token to its user, ignoring sessions that expired before
/// `now`.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn find_session_user(
    conn: &mut DbConnection,
    bearer: &str,
    now: NaiveDateTime,
) -> QueryResult<Option<User>> {
    use crate::schema::{sessions::dsl as s, users::dsl as u};
    s::sessions
        .inner_join(u::users)
        .filter(s::token.eq(bearer))
        .filter(s::expires_at.gt(now))
        .select((u::id, u::email, u::password, u::name, u::created_at))
        .first::<User>(conn)
        .await
        .optional()
}

/// Remove a single session. Returns whether a row was deleted.
///
/// # Errors
/// Returns any error produced by the delete query.
#[must_use = "handle the result"]
pub async fn delete_session(conn: &mut DbConnection, bearer: &str) -> QueryResult<bool> {
    use crate::schema::sessions::dsl::{sessions, token};
    diesel::delete(sessions.filter(token.eq(bearer)))
        .execute(conn)
        .await
        .map(|rows| rows > 0)
}

/// Remove every session that expired at or before `now`.
///
/// # Errors
/// Returns any error produced by the delete query.
#[must_use = "handle the result"]
pub async fn purge_expired_sessions(conn: &mut DbConnection, now: NaiveDateTime) -> QueryResult<usize> {
    use crate::schema::sessions::dsl::{expires_at, sessions};
    diesel::delete(sessions.filter(expires_at.le(now)))
        .execute(conn)
        .await
}
