//! Shared CLI type definitions for lista build and runtime.
//!
//! This crate provides CLI argument and configuration types used by both the
//! `build.rs` script (for man page generation) and the runtime binary.
//! Keeping these types in a separate crate keeps build-time and runtime
//! dependencies cleanly separated.

// FIXME: File-wide suppressions are unavoidable here. Clap and OrthoConfig derive macros
// inject generated code throughout the module, and there is no mechanism to narrow
// the scope without restructuring the crate.
#![expect(
    non_snake_case,
    reason = "Clap/OrthoConfig derive macros generate helper modules with uppercase names"
)]
#![expect(
    missing_docs,
    reason = "OrthoConfig and Clap derive macros generate items that cannot be documented"
)]

use clap::{Args, Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Argon2 default parameters
//
// These constants duplicate `argon2::Params::DEFAULT_*` values so that
// build-time consumers (man page generation) can use this crate without
// adding `argon2` as a build-dependency.
// ────────────────────────────────────────────────────────────────────────────

/// Default Argon2 memory cost (matches `argon2::Params::DEFAULT_M_COST`).
pub const DEFAULT_ARGON2_M_COST: u32 = 19_456;
/// Default Argon2 time cost (matches `argon2::Params::DEFAULT_T_COST`).
pub const DEFAULT_ARGON2_T_COST: u32 = 2;
/// Default Argon2 parallelism cost (matches `argon2::Params::DEFAULT_P_COST`).
pub const DEFAULT_ARGON2_P_COST: u32 = 1;

/// Default lifetime of a login session, in hours.
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 24;
/// Default number of undelivered events buffered per list channel.
pub const DEFAULT_RELAY_CAPACITY: u32 = 64;

/// Default bind address for the HTTP listener.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
/// Default database connection string or path.
pub const DEFAULT_DATABASE: &str = "lista.db";

/// Arguments for the `create-user` administrative subcommand.
#[derive(Parser, OrthoConfig, Deserialize, Serialize, Default, Debug, Clone)]
#[ortho_config(prefix = "LISTA_")]
pub struct CreateUserArgs {
    /// Email address for the new account.
    #[arg(long)]
    pub email: Option<String>,
    /// Password for the new account.
    #[arg(long)]
    pub password: Option<String>,
    /// Optional display name.
    #[arg(long)]
    pub name: Option<String>,
}

/// CLI subcommands exposed by `lista`.
#[derive(Subcommand, Deserialize, Serialize, Debug, Clone)]
pub enum Commands {
    /// Create a new user account.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
}

impl Commands {
    /// Names of every subcommand, used to split global flags from
    /// subcommand arguments when layering configuration.
    pub const NAMES: [&'static str; 1] = ["create-user"];
}

/// Runtime configuration shared by the server and administrative commands.
///
/// The default bind address `0.0.0.0:3000` listens on all interfaces.
/// Production deployments should bind to a specific interface and sit behind
/// a TLS-terminating reverse proxy, since session tokens travel in headers.
#[derive(Args, OrthoConfig, Serialize, Deserialize, Default, Debug, Clone)]
#[ortho_config(prefix = "LISTA_")]
pub struct AppConfig {
    /// Server bind address.
    #[ortho_config(default = DEFAULT_BIND.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_BIND))]
    pub bind: String,
    /// Database connection string or path.
    #[ortho_config(default = DEFAULT_DATABASE.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_DATABASE))]
    pub database: String,
    /// Argon2 memory cost parameter.
    #[ortho_config(default = DEFAULT_ARGON2_M_COST)]
    #[arg(long, default_value_t = DEFAULT_ARGON2_M_COST)]
    pub argon2_m_cost: u32,
    /// Argon2 time cost parameter.
    #[ortho_config(default = DEFAULT_ARGON2_T_COST)]
    #[arg(long, default_value_t = DEFAULT_ARGON2_T_COST)]
    pub argon2_t_cost: u32,
    /// Argon2 parallelism cost parameter.
    #[ortho_config(default = DEFAULT_ARGON2_P_COST)]
    #[arg(long, default_value_t = DEFAULT_ARGON2_P_COST)]
    pub argon2_p_cost: u32,
    /// Lifetime of a login session in hours.
    #[ortho_config(default = DEFAULT_SESSION_TTL_HOURS)]
    #[arg(long, default_value_t = DEFAULT_SESSION_TTL_HOURS)]
    pub session_ttl_hours: u32,
    /// Events buffered per list channel before slow subscribers lag.
    #[ortho_config(default = DEFAULT_RELAY_CAPACITY)]
    #[arg(long, default_value_t = DEFAULT_RELAY_CAPACITY)]
    pub relay_capacity: u32,
}

/// Top-level CLI entry point consumed by binaries.
#[derive(Parser, Deserialize, Serialize, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Application configuration.
    #[command(flatten)]
    pub config: AppConfig,
    /// Optional subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use argon2::Params;
    use clap::Parser;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn argon2_defaults_track_the_argon2_crate() {
        assert_eq!(DEFAULT_ARGON2_M_COST, Params::DEFAULT_M_COST);
        assert_eq!(DEFAULT_ARGON2_T_COST, Params::DEFAULT_T_COST);
        assert_eq!(DEFAULT_ARGON2_P_COST, Params::DEFAULT_P_COST);
    }

    #[rstest]
    fn cli_parses_create_user_subcommand() {
        let cli = Cli::try_parse_from([
            "lista",
            "--database",
            "other.db",
            "create-user",
            "--email",
            "ada@example.com",
            "--password",
            "correct horse",
        ])
        .expect("parse");

        assert_eq!(cli.config.database, "other.db");
        let Some(Commands::CreateUser(args)) = cli.command else {
            panic!("expected create-user subcommand");
        };
        assert_eq!(args.email.as_deref(), Some("ada@example.com"));
        assert_eq!(args.name, None);
    }

    #[rstest]
    fn cli_defaults_apply_without_flags() {
        let cli = Cli::try_parse_from(["lista"]).expect("parse");

        assert_eq!(cli.config.bind, DEFAULT_BIND);
        assert_eq!(cli.config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert!(cli.command.is_none());
    }
}
