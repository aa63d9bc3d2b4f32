//! List CRUD routes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::{
    auth::{ApiJson, AuthUser},
    error::{ApiError, ApiResult},
    parse_list_id,
    state::AppState,
};
use crate::{
    access::{Access, PermissionLevel, resolve_access},
    db::{
        Collaborator,
        create_list,
        delete_owned_list,
        get_owned_list,
        list_collaborators,
        lists_owned_by,
        lists_shared_with,
    },
    models::{List, NewList},
    relay::{ListEvent, notify},
};

const MAX_LIST_NAME_LEN: usize = 200;

/// Message for lists the caller cannot see.
pub const LIST_NOT_FOUND: &str = "List not found or access denied";

/// A list annotated with the caller's relationship to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListView {
    /// Stored list fields.
    #[serde(flatten)]
    pub list: List,
    /// Whether the caller owns the list.
    pub is_owner: bool,
    /// Whether the caller may modify items.
    pub can_edit: bool,
    /// Effective permission level.
    pub permission_level: PermissionLevel,
}

impl ListView {
    /// Combine a list with the access the caller holds on it.
    #[must_use]
    pub const fn new(list: List, access: Access) -> Self {
        Self {
            list,
            is_owner: access.is_owner(),
            can_edit: access.can_edit(),
            permission_level: access.level(),
        }
    }
}

/// Body accepted by `POST /api/lists`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateList {
    /// Display name.
    pub name: Option<String>,
}

/// `GET /api/lists`
///
/// Owned lists come first, then lists shared with the caller. Shared lists
/// whose grant holds an unknown level are skipped.
///
/// # Errors
/// Returns `401` when the request is not authenticated.
pub async fn index(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<Vec<ListView>>> {
    let mut conn = state.conn().await?;
    let owned = lists_owned_by(&mut conn, auth.user.id).await?;
    let shared = lists_shared_with(&mut conn, auth.user.id).await?;
    let views = owned
        .into_iter()
        .map(|list| ListView::new(list, Access::Owner))
        .chain(shared.into_iter().filter_map(|(list, level)| {
            level
                .parse::<PermissionLevel>()
                .ok()
                .map(|lvl| ListView::new(list, Access::Shared(lvl)))
        }))
        .collect();
    Ok(Json(views))
}

/// `POST /api/lists`
///
/// # Errors
/// Returns `400` when the name is missing or too long.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<CreateList>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let name = body
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(ApiError::bad_request("List name is required"))?;
    if name.chars().count() > MAX_LIST_NAME_LEN {
        return Err(ApiError::bad_request(
            "List name must be at most 200 characters",
        ));
    }
    let mut conn = state.conn().await?;
    let list = create_list(
        &mut conn,
        &NewList {
            name,
            owner_id: auth.user.id,
            created_at: Utc::now().naive_utc(),
        },
    )
    .await?;
    info!(list_id = list.id, owner_id = list.owner_id, "created list");
    Ok((StatusCode::CREATED, Json(json!({ "listId": list.id }))))
}

/// `GET /api/lists/{id}`
///
/// # Errors
/// Returns `404` when the caller has no access to the list.
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<ListView>> {
    let list_id = parse_list_id(&raw_id)?;
    let mut conn = state.conn().await?;
    let (list, access) = resolve_access(&mut conn, list_id, auth.user.id)
        .await?
        .ok_or(ApiError::NotFound(LIST_NOT_FOUND))?;
    Ok(Json(ListView::new(list, access)))
}

/// `DELETE /api/lists/{id}`
///
/// # Errors
/// Returns `404` unless the caller owns the list.
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let list_id = parse_list_id(&raw_id)?;
    let mut conn = state.conn().await?;
    if !delete_owned_list(&mut conn, list_id, auth.user.id).await? {
        return Err(ApiError::NotFound(
            "List not found or you do not have permission to delete it",
        ));
    }
    info!(list_id, "deleted list");
    notify(&state.relay, list_id, ListEvent::ListDeleted { list_id }).await;
    Ok(Json(json!({ "success": true })))
}

/// `GET /api/lists/{id}/permissions`
///
/// # Errors
/// Returns `404` unless the caller owns the list.
pub async fn collaborators(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Vec<Collaborator>>> {
    let list_id = parse_list_id(&raw_id)?;
    let mut conn = state.conn().await?;
    get_owned_list(&mut conn, list_id, auth.user.id)
        .await?
        .ok_or(ApiError::NotFound(LIST_NOT_FOUND))?;
    Ok(Json(list_collaborators(&mut conn, list_id).await?))
}
