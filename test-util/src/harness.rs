//! In-process application fixture.

use anyhow::{Context, anyhow};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use http_body_util::BodyExt;
use lista::{
    api::{AppState, router},
    server::{AppConfig, http},
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::AnyError;

/// Password used by [`TestApp::register`].
pub const PASSWORD: &str = "password123";

/// Configuration pointing at a database inside `dir`, with cheap hashing.
#[must_use]
pub fn test_config(dir: &TempDir) -> AppConfig {
    AppConfig {
        bind: "127.0.0.1:0".to_owned(),
        database: dir.path().join("lista.db").to_string_lossy().into_owned(),
        argon2_m_cost: 1024,
        argon2_t_cost: 1,
        argon2_p_cost: 1,
        session_ttl_hours: 1,
        relay_capacity: 16,
    }
}

/// Status and decoded JSON body of a response.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Parsed body, or `Value::Null` when the body is empty.
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of a failed request.
    #[must_use]
    pub fn error(&self) -> Option<&str> { self.body.get("error").and_then(Value::as_str) }
}

/// A migrated application bound to a temporary database.
pub struct TestApp {
    router: Router,
    state: AppState,
    _dir: TempDir,
}

impl TestApp {
    /// Build a fresh application.
    ///
    /// # Errors
    /// Returns an error if the temporary database cannot be prepared.
    pub async fn new() -> Result<Self, AnyError> {
        let dir = TempDir::new().context("failed to create tempdir")?;
        let cfg = test_config(&dir);
        let pool = http::setup_database(&cfg.database).await?;
        let state = http::build_state(&cfg, pool)?;
        Ok(Self {
            router: router(state.clone()),
            state,
            _dir: dir,
        })
    }

    /// Shared state behind the router.
    #[must_use]
    pub const fn state(&self) -> &AppState { &self.state }

    /// Send a raw request through the router.
    ///
    /// # Errors
    /// Returns an error if the router fails to produce a response.
    pub async fn send(&self, request: Request<Body>) -> Result<Response, AnyError> {
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Send a JSON request, optionally authenticated, and decode the reply.
    ///
    /// # Errors
    /// Returns an error if the request cannot be built or the body is not
    /// JSON.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse, AnyError> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(payload) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        let response = self.send(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok(TestResponse { status, body })
    }

    /// Register an account with [`PASSWORD`] and return its session token.
    ///
    /// # Errors
    /// Returns an error unless registration succeeds.
    pub async fn register(&self, email: &str) -> Result<String, AnyError> {
        let res = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await?;
        if res.status != StatusCode::CREATED {
            return Err(anyhow!("register {email} failed: {:?}", res.body));
        }
        res.body
            .get("token")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| anyhow!("register response lacks token"))
    }

    /// Create a list as `token` and return its id.
    ///
    /// # Errors
    /// Returns an error unless creation succeeds.
    pub async fn create_list(&self, token: &str, name: &str) -> Result<i64, AnyError> {
        let res = self
            .call(
                Method::POST,
                "/api/lists",
                Some(token),
                Some(json!({ "name": name })),
            )
            .await?;
        if res.status != StatusCode::CREATED {
            return Err(anyhow!("create list failed: {:?}", res.body));
        }
        res.body
            .get("listId")
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow!("create list response lacks listId"))
    }

    /// Share `list_id` with `email` at `level` as `token`.
    ///
    /// # Errors
    /// Returns an error unless sharing succeeds.
    pub async fn share(
        &self,
        token: &str,
        list_id: i64,
        email: &str,
        level: &str,
    ) -> Result<(), AnyError> {
        let res = self
            .call(
                Method::POST,
                "/api/lists/share",
                Some(token),
                Some(json!({ "listId": list_id, "userEmail": email, "permissionLevel": level })),
            )
            .await?;
        if res.status != StatusCode::OK {
            return Err(anyhow!("share failed: {:?}", res.body));
        }
        Ok(())
    }
}
