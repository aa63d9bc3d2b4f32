//! Manage database connections and domain queries.
//!
//! This module tree exposes helpers for creating pooled Diesel connections,
//! running embedded migrations, auditing backend capabilities, and executing
//! application queries grouped by domain concerns.

mod audit;
mod connection;
mod items;
mod lists;
mod migrations;
mod permissions;
mod sessions;
mod users;


#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub use self::audit::audit_postgres_features;
#[cfg(feature = "sqlite")]
pub use self::audit::audit_sqlite_features;
pub use self::{
    connection::{Backend, DbConnection, DbPool, MIGRATIONS, establish_pool},
    items::{create_item, delete_item, list_items, set_item_completed},
    lists::{
        create_list,
        delete_owned_list,
        get_list,
        get_owned_list,
        lists_owned_by,
        lists_shared_with,
    },
    migrations::{apply_migrations, run_migrations},
    permissions::{
        Collaborator,
        add_permission,
        get_permission,
        list_collaborators,
        remove_permission,
    },
    sessions::{create_session, delete_session, find_session_user, purge_expired_sessions},
    users::{create_user, get_user_by_email, update_user_name},
};
