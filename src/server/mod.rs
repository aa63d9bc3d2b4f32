//! Server orchestration for the HTTP runtime.
//!
//! This module exposes the command-line interface and reusable helpers that
//! power the `lista` binary. The binary remains a thin wrapper that only
//! needs to call [`run`].

pub mod admin;
pub mod cli;
pub mod http;

use anyhow::Result;
pub use cli::{AppConfig, Cli, Commands, CreateUserArgs, ResolvedCli, load_cli};
pub use http::run_daemon;

/// Parse CLI arguments and execute the requested command or daemon.
///
/// # Errors
///
/// Returns any error emitted while parsing configuration or running the
/// server.
pub async fn run() -> Result<()> {
    let cli = load_cli()?;
    run_with_cli(cli).await
}

/// Execute the server logic using an already resolved [`ResolvedCli`].
///
/// # Errors
///
/// Propagates failures from the administrative command or the daemon.
pub async fn run_with_cli(cli: ResolvedCli) -> Result<()> {
    let ResolvedCli { config, command } = cli;
    if let Some(command) = command {
        admin::run_command(command, &config).await
    } else {
        run_daemon(config).await
    }
}
