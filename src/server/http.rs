//! HTTP daemon runtime.
//!
//! Builds the shared [`AppState`] from configuration, prepares the database
//! and serves the API router until a shutdown signal arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
use url::Url;

use super::{admin, cli::AppConfig};
use crate::{
    api::{AppState, router},
    db::{DbPool, apply_migrations, establish_pool},
    relay::BroadcastRelay,
};

/// Assemble the application state for `pool` using `cfg`.
///
/// # Errors
///
/// Returns an error when the Argon2 parameters or relay capacity are invalid.
pub fn build_state(cfg: &AppConfig, pool: DbPool) -> Result<AppState> {
    let argon2 = Arc::new(admin::argon2_from_config(cfg)?);
    let capacity = usize::try_from(cfg.relay_capacity).context("relay capacity out of range")?;
    Ok(AppState {
        pool,
        argon2,
        relay: Arc::new(BroadcastRelay::new(capacity)),
        session_ttl: Duration::hours(i64::from(cfg.session_ttl_hours)),
    })
}

/// Serve the HTTP API using the supplied configuration.
///
/// # Errors
///
/// Returns any failure reported while preparing the database, binding the
/// socket, or serving requests.
pub async fn run_daemon(cfg: AppConfig) -> Result<()> {
    let pool = setup_database(&cfg.database).await?;
    let state = build_state(&cfg, pool)?;

    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;
    info!(bind = %cfg.bind, "lista listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("server stopped");
    Ok(())
}

/// Determine whether the supplied connection string targets Postgres.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
fn is_postgres_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "postgres" | "postgresql"),
        Err(err) => {
            warn!("invalid database url '{s}': {err}");
            false
        }
    }
}

/// Create the connection pool, audit backend features and apply migrations.
///
/// # Errors
///
/// Returns an error if the pool cannot be built, the backend is unsupported,
/// or migrations fail.
pub async fn setup_database(database: &str) -> Result<DbPool> {
    let pool = establish_pool(database)
        .await
        .context("failed to build connection pool")?;
    {
        let mut conn = pool.get().await.context("failed to get db connection")?;
        #[cfg(feature = "sqlite")]
        crate::db::audit_sqlite_features(&mut conn).await?;
        #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
        if is_postgres_url(database) {
            crate::db::audit_postgres_features(&mut conn).await?;
        }
        apply_migrations(&mut conn, database).await?;
    }
    Ok(pool)
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(err) = res {
                            warn!("failed to listen for Ctrl-C: {err}");
                        }
                    },
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!("failed to install SIGTERM handler: {err}");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
    info!("shutdown signal received");
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl-C: {err}");
    }
}
