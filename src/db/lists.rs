//! List record helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::{AsyncConnection, RunQueryDsl, scoped_futures::ScopedFutureExt};

use super::connection::DbConnection;
use crate::models::{List, NewList};

/// Insert a new list and return the stored row.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_list(conn: &mut DbConnection, list: &NewList<'_>) -> QueryResult<List> {
    use crate::schema::lists::dsl::lists;
    diesel::insert_into(lists)
        .values(list)
        .get_result::<List>(conn)
        .await
}

/// Fetch a list by id regardless of who owns it.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_list(conn: &mut DbConnection, lid: i32) -> QueryResult<Option<List>> {
    use crate::schema::lists::dsl::lists;
    lists.find(lid).first::<List>(conn).await.optional()
}

/// Fetch a list only when `uid` owns it.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_owned_list(conn: &mut DbConnection, lid: i32, uid: i32) -> QueryResult<Option<List>> {
    use crate::schema::lists::dsl::{id, lists, owner_id};
    lists
        .filter(id.eq(lid))
        .filter(owner_id.eq(uid))
        .first::<List>(conn)
        .await
        .optional()
}

/// Lists owned by `uid`, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn lists_owned_by(conn: &mut DbConnection, uid: i32) -> QueryResult<Vec<List>> {
    use crate::schema::lists::dsl::{created_at, id, lists, owner_id};
    lists
        .filter(owner_id.eq(uid))
        .order((created_at.desc(), id.desc()))
        .load::<List>(conn)
        .await
}

/// Lists shared with `uid`, newest first, paired with the granted level.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn lists_shared_with(
    conn: &mut DbConnection,
    uid: i32,
) -> QueryResult<Vec<(List, String)>> {
    use crate::schema::{list_permissions::dsl as p, lists::dsl as l};
    l::lists
        .inner_join(p::list_permissions)
        .filter(p::user_id.eq(uid))
        .order((l::created_at.desc(), l::id.desc()))
        .select(((l::id, l::name, l::owner_id, l::created_at), p::permission_level))
        .load::<(List, String)>(conn)
        .await
}

/// Delete a list owned by `uid` together with its items and grants.
///
/// Returns `false` without touching anything when the list does not exist or
/// belongs to someone else.
///
/// # Errors
/// Returns any error produced by the delete queries; the transaction is
/// rolled back in that case.
#[must_use = "handle the result"]
pub async fn delete_owned_list(conn: &mut DbConnection, lid: i32, uid: i32) -> QueryResult<bool> {
    use crate::schema::{items::dsl as i, list_permissions::dsl as p, lists::dsl as l};
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        async move {
            let owned = diesel::delete(l::lists.filter(l::id.eq(lid)).filter(l::owner_id.eq(uid)))
                .execute(conn)
                .await?;
            if owned == 0 {
                return Ok(false);
            }
            diesel::delete(i::items.filter(i::list_id.eq(lid)))
                .execute(conn)
                .await?;
            diesel::delete(p::list_permissions.filter(p::list_id.eq(lid)))
                .execute(conn)
                .await?;
            Ok(true)
        }
        .scope_boxed()
    })
    .await
}
