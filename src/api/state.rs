//! Shared resources handed to every route handler.

use std::sync::Arc;

use argon2::Argon2;
use chrono::Duration;

use crate::{
    db::{DbConnection, DbPool},
    relay::Relay,
};

use super::error::ApiResult;

/// Application state cloned into each request.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Password hasher configured from the runtime settings.
    pub argon2: Arc<Argon2<'static>>,
    /// Real-time event fan-out.
    pub relay: Arc<dyn Relay>,
    /// Lifetime of newly issued sessions.
    pub session_ttl: Duration,
}

impl AppState {
    /// Check out a pooled connection.
    ///
    /// # Errors
    /// Returns [`ApiError::Pool`](super::error::ApiError::Pool) when the pool
    /// cannot supply a connection.
    pub async fn conn(
        &self,
    ) -> ApiResult<diesel_async::pooled_connection::bb8::PooledConnection<'_, DbConnection>> {
        Ok(self.pool.get().await?)
    }
}
