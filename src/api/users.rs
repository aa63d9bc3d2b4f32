//! Profile routes for the authenticated user.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use super::{
    Message,
    auth::{ApiJson, AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
};
use crate::db::update_user_name;

const MAX_NAME_LEN: usize = 100;

/// Public view of an account.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Account id.
    pub id: i32,
    /// Normalised email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
}

/// Body accepted by `POST /api/users`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New display name; blank clears it.
    pub name: Option<String>,
}

/// `GET /api/users/me`
///
/// # Errors
/// Returns `401` when the request is not authenticated.
#[expect(clippy::unused_async, reason = "axum handlers must be async")]
pub async fn me(auth: AuthUser) -> ApiResult<Json<Profile>> {
    let AuthUser { user, .. } = auth;
    Ok(Json(Profile {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}

/// `POST /api/users`
///
/// # Errors
/// Returns `400` when the name is too long.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<ProfileUpdate>,
) -> ApiResult<Json<Message>> {
    let name = body.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    if name.is_some_and(|n| n.chars().count() > MAX_NAME_LEN) {
        return Err(ApiError::bad_request("Name must be at most 100 characters"));
    }
    let mut conn = state.conn().await?;
    update_user_name(&mut conn, auth.user.id, name).await?;
    Ok(Json(Message::new("User saved successfully")))
}
