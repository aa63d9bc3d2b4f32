//! Sharing grants between lists and non-owner users.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;
use serde::Serialize;

use super::connection::DbConnection;
use crate::models::{ListPermission, NewListPermission};

/// A grantee of a list joined with their public profile.
#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    /// Grantee id.
    pub user_id: i32,
    /// Grantee email.
    pub email: String,
    /// Grantee display name.
    pub name: Option<String>,
    /// `edit` or `view`.
    pub permission_level: String,
}

/// Fetch the grant `uid` holds on `lid`, if any.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_permission(
    conn: &mut DbConnection,
    lid: i32,
    uid: i32,
) -> QueryResult<Option<ListPermission>> {
    use crate::schema::list_permissions::dsl::list_permissions;
    list_permissions
        .find((lid, uid))
        .first::<ListPermission>(conn)
        .await
        .optional()
}

/// Record a new grant.
///
/// # Errors
/// Returns any error produced by the insertion query, including a unique
/// violation when the grant already exists.
#[must_use = "handle the result"]
pub async fn add_permission(
    conn: &mut DbConnection,
    grant: &NewListPermission<'_>,
) -> QueryResult<usize> {
    use crate::schema::list_permissions::dsl::list_permissions;
    diesel::insert_into(list_permissions)
        .values(grant)
        .execute(conn)
        .await
}

/// Revoke the grant `uid` holds on `lid`. Returns whether a row was removed.
///
/// # Errors
/// Returns any error produced by the delete query.
#[must_use = "handle the result"]
pub async fn remove_permission(conn: &mut DbConnection, lid: i32, uid: i32) -> QueryResult<bool> {
    use crate::schema::list_permissions::dsl::list_permissions;
    diesel::delete(list_permissions.find((lid, uid)))
        .execute(conn)
        .await
        .map(|rows| rows > 0)
}

/// Everyone `lid` is shared with, oldest grant first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_collaborators(conn: &mut DbConnection, lid: i32) -> QueryResult<Vec<Collaborator>> {
    use crate::schema::{list_permissions::dsl as p, users::dsl as u};
    p::list_permissions
        .inner_join(u::users)
        .filter(p::list_id.eq(lid))
        .order((p::created_at.asc(), u::id.asc()))
        .select((u::id, u::email, u::name, p::permission_level))
        .load::<Collaborator>(conn)
        .await
}
