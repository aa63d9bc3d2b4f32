//! Granting and revoking access to a list.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{
    Message,
    auth::{ApiJson, AuthUser},
    error::{ApiError, ApiResult, is_unique_violation},
    parse_list_id,
    state::AppState,
};
use crate::{
    access::PermissionLevel,
    db::{
        DbConnection,
        add_permission,
        get_owned_list,
        get_permission,
        get_user_by_email,
        remove_permission,
    },
    models::{NewListPermission, User},
    relay::{ListEvent, notify},
    users::normalize_email,
};

const SHARE_DENIED: &str = "List not found or you don't have permission to share";
const ALREADY_SHARED: &str = "List already shared with this user";

/// Body accepted by both share routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    /// Target list, as a number or numeric string.
    pub list_id: Option<Value>,
    /// Email of the collaborator.
    pub user_email: Option<String>,
    /// `edit` (default) or `view`; ignored when revoking.
    pub permission_level: Option<String>,
}

impl ShareRequest {
    fn required(&self) -> ApiResult<(i32, &str)> {
        let email = self
            .user_email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());
        let (Some(raw_id), Some(email)) = (self.list_id.as_ref().filter(|v| !v.is_null()), email)
        else {
            return Err(ApiError::bad_request("Missing fields"));
        };
        let list_id = match raw_id {
            Value::Number(n) => n
                .as_i64()
                .and_then(|id| i32::try_from(id).ok())
                .filter(|id| *id > 0)
                .ok_or(ApiError::bad_request("Invalid list ID"))?,
            Value::String(s) => parse_list_id(s)?,
            _ => return Err(ApiError::bad_request("Invalid list ID")),
        };
        Ok((list_id, email))
    }

    fn level(&self) -> ApiResult<PermissionLevel> {
        self.permission_level
            .as_deref()
            .map_or(Ok(PermissionLevel::default()), |raw| {
                raw.trim()
                    .to_ascii_lowercase()
                    .parse()
                    .map_err(|_| ApiError::bad_request("Invalid permission level"))
            })
    }
}

async fn owned_list_and_target(
    conn: &mut DbConnection,
    owner: &User,
    list_id: i32,
    email: &str,
) -> ApiResult<User> {
    get_owned_list(conn, list_id, owner.id)
        .await?
        .ok_or(ApiError::NotFound(SHARE_DENIED))?;
    let Some(email) = normalize_email(email) else {
        return Err(ApiError::NotFound("User not found"));
    };
    get_user_by_email(conn, &email)
        .await?
        .ok_or(ApiError::NotFound("User not found"))
}

/// `POST /api/lists/share`
///
/// # Errors
/// Returns `400` for invalid input or a duplicate grant and `404` when the
/// list or the target user cannot be found.
pub async fn share(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<ShareRequest>,
) -> ApiResult<Json<Message>> {
    let (list_id, email) = body.required()?;
    let level = body.level()?;
    let mut conn = state.conn().await?;
    let target = owned_list_and_target(&mut conn, &auth.user, list_id, email).await?;
    if target.id == auth.user.id {
        return Err(ApiError::bad_request("Cannot share a list with its owner"));
    }
    if get_permission(&mut conn, list_id, target.id).await?.is_some() {
        return Err(ApiError::bad_request(ALREADY_SHARED));
    }
    let grant = NewListPermission {
        list_id,
        user_id: target.id,
        permission_level: level.as_str(),
        created_at: Utc::now().naive_utc(),
    };
    match add_permission(&mut conn, &grant).await {
        Ok(_) => {}
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::bad_request(ALREADY_SHARED));
        }
        Err(err) => return Err(err.into()),
    }
    info!(list_id, user_id = target.id, %level, "shared list");
    Ok(Json(Message::new("List shared successfully")))
}

/// `DELETE /api/lists/share`
///
/// # Errors
/// Returns `404` when the list, the user or the grant cannot be found.
pub async fn unshare(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<ShareRequest>,
) -> ApiResult<Json<Message>> {
    let (list_id, email) = body.required()?;
    let mut conn = state.conn().await?;
    let target = owned_list_and_target(&mut conn, &auth.user, list_id, email).await?;
    if !remove_permission(&mut conn, list_id, target.id).await? {
        return Err(ApiError::NotFound("Permission not found"));
    }
    info!(list_id, user_id = target.id, "revoked list access");
    notify(
        &state.relay,
        list_id,
        ListEvent::AccessRevoked { user_id: target.id },
    )
    .await;
    Ok(Json(Message::new("Access revoked successfully")))
}
