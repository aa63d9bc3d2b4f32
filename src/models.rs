//! Database row types and their insertable counterparts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

/// A registered account.
///
/// `password` holds the Argon2 PHC string; the type deliberately does not
/// implement `Serialize`.
#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key.
    pub id: i32,
    /// Normalised (trimmed, lowercased) email address.
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password: String,
    /// Optional display name.
    pub name: Option<String>,
    /// Account creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// Values required to insert a [`User`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    /// Normalised email address.
    pub email: &'a str,
    /// Argon2 PHC hash of the password.
    pub password: &'a str,
    /// Optional display name.
    pub name: Option<&'a str>,
}

/// A bearer session issued at login or registration.
#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,
    /// Owning user.
    pub user_id: i32,
    /// Issue time (UTC).
    pub created_at: NaiveDateTime,
    /// Expiry time (UTC).
    pub expires_at: NaiveDateTime,
}

/// Values required to insert a [`Session`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    /// Opaque bearer token.
    pub token: &'a str,
    /// Owning user.
    pub user_id: i32,
    /// Expiry time (UTC).
    pub expires_at: NaiveDateTime,
}

/// A named to-do list owned by one user.
#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct List {
    /// Primary key.
    pub id: i32,
    /// Display name.
    pub name: String,
    /// Owning user.
    pub owner_id: i32,
    /// Creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// Values required to insert a [`List`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::lists)]
pub struct NewList<'a> {
    /// Display name, already validated.
    pub name: &'a str,
    /// Owning user.
    pub owner_id: i32,
    /// Creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// An entry within a [`List`].
#[derive(Queryable, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Primary key.
    pub id: i32,
    /// Owning list.
    pub list_id: i32,
    /// Free-form text.
    pub content: String,
    /// Whether the item has been checked off.
    pub completed: bool,
    /// Creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// Values required to insert an [`Item`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::items)]
pub struct NewItem<'a> {
    /// Owning list.
    pub list_id: i32,
    /// Free-form text, already validated.
    pub content: &'a str,
    /// Initial completion state.
    pub completed: bool,
    /// Creation time (UTC).
    pub created_at: NaiveDateTime,
}

/// A grant of access on a list to a user other than its owner.
#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct ListPermission {
    /// Shared list.
    pub list_id: i32,
    /// Grantee.
    pub user_id: i32,
    /// `edit` or `view`.
    pub permission_level: String,
    /// Grant time (UTC).
    pub created_at: NaiveDateTime,
}

/// Values required to insert a [`ListPermission`].
#[derive(Insertable)]
#[diesel(table_name = crate::schema::list_permissions)]
pub struct NewListPermission<'a> {
    /// Shared list.
    pub list_id: i32,
    /// Grantee.
    pub user_id: i32,
    /// `edit` or `view`.
    pub permission_level: &'a str,
    /// Grant time (UTC).
    pub created_at: NaiveDateTime,
}
