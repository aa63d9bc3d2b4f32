//! Item record helpers.
//!
//! None of these functions check list access; callers resolve an
//! [`Access`](crate::access::Access) first.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{Item, NewItem};

/// Items of `lid`, newest first with ties broken by descending id.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_items(conn: &mut DbConnection, lid: i32) -> QueryResult<Vec<Item>> {
    use crate::schema::items::dsl::{created_at, id, items, list_id};
    items
        .filter(list_id.eq(lid))
        .order((created_at.desc(), id.desc()))
        .load::<Item>(conn)
        .await
}

/// Insert an item and return the stored row.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_item(conn: &mut DbConnection, item: &NewItem<'_>) -> QueryResult<Item> {
    use crate::schema::items::dsl::items;
    diesel::insert_into(items)
        .values(item)
        .get_result::<Item>(conn)
        .await
}

/// Set the completion flag of an item belonging to `lid`.
///
/// Returns `None` when no such item exists in that list.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn set_item_completed(
    conn: &mut DbConnection,
    lid: i32,
    iid: i32,
    done: bool,
) -> QueryResult<Option<Item>> {
    use crate::schema::items::dsl::{completed, id, items, list_id};
    diesel::update(items.filter(id.eq(iid)).filter(list_id.eq(lid)))
        .set(completed.eq(done))
        .get_result::<Item>(conn)
        .await
        .optional()
}

/// Delete an item belonging to `lid`. Returns whether a row was removed.
///
/// # Errors
/// Returns any error produced by the delete query.
#[must_use = "handle the result"]
pub async fn delete_item(conn: &mut DbConnection, lid: i32, iid: i32) -> QueryResult<bool> {
    use crate::schema::items::dsl::{id, items, list_id};
    diesel::delete(items.filter(id.eq(iid)).filter(list_id.eq(lid)))
        .execute(conn)
        .await
        .map(|rows| rows > 0)
}
