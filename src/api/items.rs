//! Item routes nested under a list.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use super::{
    Message,
    auth::{ApiJson, AuthUser},
    error::{ApiError, ApiResult},
    parse_list_id,
    require_access,
    state::AppState,
};
use crate::{
    access::ListCapabilities,
    db::{create_item, delete_item, list_items, set_item_completed},
    models::{Item, NewItem},
    relay::{ListEvent, notify},
};

const MAX_CONTENT_LEN: usize = 1000;
const ITEM_NOT_FOUND: &str = "Item not found";

/// Body accepted by `POST /api/lists/{id}/items`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateItem {
    /// Item text.
    pub content: Option<String>,
}

/// Body accepted by `PUT /api/lists/{id}/items`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    /// Target item.
    pub item_id: Option<i32>,
    /// New completion state.
    pub completed: Option<bool>,
}

/// Body accepted by `DELETE /api/lists/{id}/items`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItem {
    /// Target item.
    pub item_id: Option<i32>,
}

/// `GET /api/lists/{id}/items`
///
/// # Errors
/// Returns `404` when the caller cannot view the list.
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Vec<Item>>> {
    let list_id = parse_list_id(&raw_id)?;
    let mut conn = state.conn().await?;
    require_access(&mut conn, list_id, auth.user.id, ListCapabilities::VIEW).await?;
    Ok(Json(list_items(&mut conn, list_id).await?))
}

/// `POST /api/lists/{id}/items`
///
/// # Errors
/// Returns `400` for missing content and `403`/`404` without edit access.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(body): ApiJson<CreateItem>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    let list_id = parse_list_id(&raw_id)?;
    let content = body
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::bad_request("Content is required"))?;
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::bad_request(
            "Content must be at most 1000 characters",
        ));
    }
    let mut conn = state.conn().await?;
    require_access(&mut conn, list_id, auth.user.id, ListCapabilities::EDIT_ITEMS).await?;
    let item = create_item(
        &mut conn,
        &NewItem {
            list_id,
            content,
            completed: false,
            created_at: Utc::now().naive_utc(),
        },
    )
    .await?;
    debug!(list_id, item_id = item.id, "added item");
    notify(&state.relay, list_id, ListEvent::ItemAdded(item.clone())).await;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /api/lists/{id}/items`
///
/// # Errors
/// Returns `400` for missing fields and `404` for an unknown item.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(body): ApiJson<UpdateItem>,
) -> ApiResult<Json<Message>> {
    let list_id = parse_list_id(&raw_id)?;
    let (Some(item_id), Some(completed)) = (body.item_id, body.completed) else {
        return Err(ApiError::bad_request("Missing fields"));
    };
    let mut conn = state.conn().await?;
    require_access(&mut conn, list_id, auth.user.id, ListCapabilities::EDIT_ITEMS).await?;
    set_item_completed(&mut conn, list_id, item_id, completed)
        .await?
        .ok_or(ApiError::NotFound(ITEM_NOT_FOUND))?;
    notify(
        &state.relay,
        list_id,
        ListEvent::ItemUpdated { item_id, completed },
    )
    .await;
    Ok(Json(Message::new("Item updated successfully")))
}

/// `DELETE /api/lists/{id}/items`
///
/// # Errors
/// Returns `400` for a missing id and `404` for an unknown item.
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(raw_id): Path<String>,
    ApiJson(body): ApiJson<DeleteItem>,
) -> ApiResult<Json<Message>> {
    let list_id = parse_list_id(&raw_id)?;
    let item_id = body.item_id.ok_or(ApiError::bad_request("Missing fields"))?;
    let mut conn = state.conn().await?;
    require_access(&mut conn, list_id, auth.user.id, ListCapabilities::EDIT_ITEMS).await?;
    if !delete_item(&mut conn, list_id, item_id).await? {
        return Err(ApiError::NotFound(ITEM_NOT_FOUND));
    }
    notify(&state.relay, list_id, ListEvent::ItemDeleted { item_id }).await;
    Ok(Json(Message::new("Item deleted successfully")))
}
