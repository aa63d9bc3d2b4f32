//! Binary entry point for the lista HTTP server.
//!
//! The runtime logic lives in `lista::server`, so this binary only installs
//! the tracing subscriber and delegates to the shared library code.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
    lista::server::run().await
}
