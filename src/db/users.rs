//! User record helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{NewUser, User};

/// Look up a user record by normalised email address.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_user_by_email(conn: &mut DbConnection, address: &str) -> QueryResult<Option<User>> {
    use crate::schema::users::dsl::{email, users};
    users
        .filter(email.eq(address))
        .first::<User>(conn)
        .await
        .optional()
}

/// Insert a new user record and return it.
///
/// # Errors
/// Returns any error produced by the insertion query, including a unique
/// violation when the email is already registered.
#[must_use = "handle the result"]
pub async fn create_user(conn: &mut DbConnection, user: &NewUser<'_>) -> QueryResult<User> {
    use crate::schema::users::dsl::users;
    diesel::insert_into(users)
        .values(user)
        .get_result::<User>(conn)
        .await
}

/// Replace a user's display name.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn update_user_name(
    conn: &mut DbConnection,
    uid: i32,
    new_name: Option<&str>,
) -> QueryResult<usize> {
    use crate::schema::users::dsl::{name, users};
    diesel::update(users.find(uid))
        .set(name.eq(new_name))
        .execute(conn)
        .await
}
