//! HTTP surface of the service.
//!
//! [`router`] wires every route to its handler. Handlers authenticate through
//! the [`AuthUser`](auth::AuthUser) extractor, resolve list access, call the
//! `db` helpers and finally publish a relay event once the write succeeded.

pub mod auth;
pub mod error;
pub mod events;
pub mod items;
pub mod lists;
pub mod share;
pub mod state;
pub mod users;


use axum::{
    Json,
    Router,
    http::{Method, header},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use self::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use crate::{
    access::{Access, ListCapabilities, resolve_access},
    db::DbConnection,
    models::List,
};

/// Acknowledgement body of the form `{"message": "..."}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Human-readable outcome.
    pub message: String,
}

impl Message {
    /// Wrap `text` in a message body.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            message: text.to_owned(),
        }
    }
}

/// Parse a list id taken from a path segment or request body.
///
/// # Errors
/// Returns `400 "Invalid list ID"` unless `raw` is a positive integer.
pub fn parse_list_id(raw: &str) -> ApiResult<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::bad_request("Invalid list ID"))
}

/// Resolve the caller's access to a list and insist on `needed`.
///
/// Callers without any access see `404`, so list existence is not revealed.
/// Collaborators lacking a capability see `403`.
///
/// # Errors
/// Returns [`ApiError::NotFound`] or [`ApiError::Forbidden`] as described, or
/// a database error.
pub async fn require_access(
    conn: &mut DbConnection,
    list_id: i32,
    user_id: i32,
    needed: ListCapabilities,
) -> ApiResult<(List, Access)> {
    let (list, access) = resolve_access(conn, list_id, user_id)
        .await?
        .ok_or(ApiError::NotFound(lists::LIST_NOT_FOUND))?;
    if !access.capabilities().contains(needed) {
        return Err(ApiError::Forbidden(
            "You do not have permission to modify this list",
        ));
    }
    Ok((list, access))
}

#[expect(clippy::unused_async, reason = "axum handlers must be async")]
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

/// Build the application router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/users", post(users::update_profile))
        .route("/api/users/me", get(users::me))
        .route("/api/lists", get(lists::index).post(lists::create))
        .route("/api/lists/share", post(share::share).delete(share::unshare))
        .route("/api/lists/{id}", get(lists::show).delete(lists::remove))
        .route(
            "/api/lists/{id}/items",
            get(items::index)
                .post(items::create)
                .put(items::update)
                .delete(items::remove),
        )
        .route("/api/lists/{id}/permissions", get(lists::collaborators))
        .route("/api/lists/{id}/events", get(events::subscribe))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
