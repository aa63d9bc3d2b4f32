//! Registration, login and session authentication.

use axum::{
    extract::{FromRequest, FromRequestParts, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    error::{ApiError, ApiResult, is_unique_violation},
    state::AppState,
};
use crate::{
    db::{
        DbConnection,
        create_session,
        create_user,
        delete_session,
        find_session_user,
        get_user_by_email,
        purge_expired_sessions,
    },
    models::{NewSession, NewUser, User},
    users::{hash_password, normalize_email, password_acceptable, verify_password},
};

/// Length of issued session tokens.
pub const TOKEN_LEN: usize = 48;

/// Name of the cookie consulted when no `Authorization` header is present.
pub const TOKEN_COOKIE: &str = "token";

/// JSON body extractor whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Account behind the session.
    pub user: User,
    /// Token the request presented.
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
        let mut conn = state.conn().await?;
        let user = find_session_user(&mut conn, &token, Utc::now().naive_utc())
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(Self { user, token })
    }
}

/// Pull a session token from the `Authorization: Bearer` header, falling back
/// to the `token` cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

async fn issue_session(conn: &mut DbConnection, state: &AppState, user_id: i32) -> ApiResult<String> {
    let token = generate_token();
    let session = NewSession {
        token: &token,
        user_id,
        expires_at: Utc::now().naive_utc() + state.session_ttl,
    };
    create_session(conn, &session).await?;
    Ok(token)
}

/// Credentials submitted to the register and login routes.
#[derive(Debug, Default, Deserialize)]
pub struct Credentials {
    /// Email address.
    pub email: Option<String>,
    /// Plain-text password.
    pub password: Option<String>,
    /// Optional display name, honoured on registration only.
    pub name: Option<String>,
}

/// Body returned by a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Session token for the new account.
    pub token: String,
}

/// Body returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Session token.
    pub token: String,
}

fn required_credentials(body: &Credentials) -> ApiResult<(&str, &str)> {
    match (body.email.as_deref(), body.password.as_deref()) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::bad_request("Email and password are required")),
    }
}

/// `POST /api/auth/register`
///
/// # Errors
/// Returns `400` for invalid input or a taken email.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let (raw_email, password) = required_credentials(&body)?;
    let email = normalize_email(raw_email).ok_or(ApiError::bad_request("A valid email is required"))?;
    if !password_acceptable(password) {
        return Err(ApiError::bad_request(
            "Password must be at least 8 characters",
        ));
    }
    let name = body.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let mut conn = state.conn().await?;
    if get_user_by_email(&mut conn, &email).await?.is_some() {
        return Err(ApiError::bad_request("User already exists"));
    }
    let hashed = hash_password(&state.argon2, password)?;
    let new_user = NewUser {
        email: &email,
        password: &hashed,
        name,
    };
    let user = match create_user(&mut conn, &new_user).await {
        Ok(user) => user,
        Err(err) if is_unique_violation(&err) => {
            return Err(ApiError::bad_request("User already exists"));
        }
        Err(err) => return Err(err.into()),
    };
    let token = issue_session(&mut conn, &state, user.id).await?;
    info!(user_id = user.id, "registered user");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_owned(),
            token,
        }),
    ))
}

/// `POST /api/auth/login`
///
/// # Errors
/// Returns `400` for an unknown email or a wrong password.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Credentials>,
) -> ApiResult<Json<TokenResponse>> {
    let (raw_email, password) = required_credentials(&body)?;
    let email = normalize_email(raw_email).ok_or(ApiError::bad_request("User not found"))?;

    let mut conn = state.conn().await?;
    let user = get_user_by_email(&mut conn, &email)
        .await?
        .ok_or(ApiError::bad_request("User not found"))?;
    if !verify_password(&state.argon2, &user.password, password)? {
        return Err(ApiError::bad_request("Invalid password"));
    }
    let purged = purge_expired_sessions(&mut conn, Utc::now().naive_utc()).await?;
    let token = issue_session(&mut conn, &state, user.id).await?;
    info!(user_id = user.id, purged, "user logged in");
    Ok(Json(TokenResponse { token }))
}

/// `POST /api/auth/logout`
///
/// # Errors
/// Returns `401` when the request is not authenticated.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<StatusCode> {
    let mut conn = state.conn().await?;
    delete_session(&mut conn, &auth.token).await?;
    info!(user_id = auth.user.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}
