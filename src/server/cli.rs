//! Command-line interface and layered configuration loading.
//!
//! The clap/OrthoConfig types live in the `cli-defs` crate so `build.rs` can
//! render a man page from them. This module re-exports those types and
//! resolves the final configuration: defaults, then `.lista.toml`, then
//! `LISTA_*` environment variables, then command-line flags.

use std::ffi::OsString;

use anyhow::{Context, Result};
pub use cli_defs::{AppConfig, Cli, Commands, CreateUserArgs};
use clap::Parser;
use ortho_config::OrthoConfig;

/// Parsed command line with its configuration fully layered.
#[derive(Debug, Clone)]
pub struct ResolvedCli {
    /// Merged runtime configuration.
    pub config: AppConfig,
    /// Optional administrative subcommand.
    pub command: Option<Commands>,
}

/// Resolve the process arguments into a [`ResolvedCli`].
///
/// # Errors
/// Returns an error when the arguments are invalid or configuration sources
/// cannot be merged.
pub fn load_cli() -> Result<ResolvedCli> { load_cli_from(std::env::args_os()) }

/// Resolve an explicit argument list into a [`ResolvedCli`].
///
/// Global flags are the arguments preceding the first subcommand name; only
/// those are layered over the file and environment sources.
///
/// # Errors
/// Returns an error when the arguments are invalid or configuration sources
/// cannot be merged.
pub fn load_cli_from<I, T>(args: I) -> Result<ResolvedCli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let cli = Cli::try_parse_from(args.iter().cloned()).context("invalid command line")?;
    let globals = args
        .iter()
        .position(|arg| arg.to_str().is_some_and(|s| Commands::NAMES.contains(&s)))
        .unwrap_or(args.len());
    let config = AppConfig::load_from_iter(args.iter().take(globals).cloned())
        .context("failed to load configuration")?;
    Ok(ResolvedCli {
        config,
        command: cli.command,
    })
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn env_config_loading() {
        Jail::expect_with(|j| {
            j.set_env("LISTA_BIND", "127.0.0.1:8000");
            j.set_env("LISTA_DATABASE", "env.db");
            let cfg = AppConfig::load_from_iter(["lista"]).expect("load");
            assert_eq!(cfg.bind, "127.0.0.1:8000");
            assert_eq!(cfg.database, "env.db".to_owned());
            Ok(())
        });
    }

    #[rstest]
    fn cli_overrides_env() {
        Jail::expect_with(|j| {
            j.set_env("LISTA_BIND", "127.0.0.1:8000");
            let cfg =
                AppConfig::load_from_iter(["lista", "--bind", "0.0.0.0:9000"]).expect("load");
            assert_eq!(cfg.bind, "0.0.0.0:9000");
            Ok(())
        });
    }

    #[rstest]
    fn loads_from_dotfile() {
        Jail::expect_with(|j| {
            j.create_file(".lista.toml", "bind = \"1.2.3.4:1111\"\nrelay_capacity = 8")?;
            let cfg = AppConfig::load_from_iter(["lista"]).expect("load");
            assert_eq!(cfg.bind, "1.2.3.4:1111".to_owned());
            assert_eq!(cfg.relay_capacity, 8);
            Ok(())
        });
    }

    #[rstest]
    fn session_ttl_from_env() {
        Jail::expect_with(|j| {
            j.set_env("LISTA_SESSION_TTL_HOURS", "2");
            let cfg = AppConfig::load_from_iter(["lista"]).expect("load");
            assert_eq!(cfg.session_ttl_hours, 2);
            Ok(())
        });
    }

    #[rstest]
    fn resolves_globals_before_subcommand() {
        Jail::expect_with(|j| {
            j.set_env("LISTA_BIND", "127.0.0.1:7000");
            let resolved = load_cli_from([
                "lista",
                "--database",
                "cli.db",
                "create-user",
                "--email",
                "ada@example.com",
                "--password",
                "long enough",
            ])
            .expect("resolve");
            assert_eq!(resolved.config.database, "cli.db");
            assert_eq!(resolved.config.bind, "127.0.0.1:7000");
            assert!(matches!(resolved.command, Some(Commands::CreateUser(_))));
            Ok(())
        });
    }

    #[rstest]
    fn rejects_unknown_flags() {
        assert!(load_cli_from(["lista", "--no-such-flag"]).is_err());
    }
}
