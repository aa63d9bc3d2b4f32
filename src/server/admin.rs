//! Administrative commands run from the command line instead of the daemon.

#![allow(
    clippy::shadow_reuse,
    reason = "intentional shadowing for config merging"
)]
#![allow(
    clippy::print_stdout,
    reason = "intentional user output for CLI commands"
)]

use anyhow::{Context, Result, anyhow, bail};
use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use diesel_async::AsyncConnection;
use ortho_config::load_and_merge_subcommand_for;
use tracing::info;

use super::cli::{AppConfig, Commands, CreateUserArgs};
use crate::{
    db::{DbConnection, apply_migrations, create_user, get_user_by_email},
    models,
    users::{hash_password, normalize_email, password_acceptable},
};

/// Execute an administrative command.
///
/// # Errors
///
/// Propagates failures from configuration merging or database operations.
pub async fn run_command(command: Commands, cfg: &AppConfig) -> Result<()> {
    match command {
        Commands::CreateUser(args) => {
            let args = load_and_merge_subcommand_for::<CreateUserArgs>(&args)?;
            run_create_user(args, cfg).await
        }
    }
}

/// Build an Argon2 instance using the supplied configuration parameters.
///
/// # Errors
///
/// Returns any error emitted while constructing the Argon2 parameter set.
pub fn argon2_from_config(cfg: &AppConfig) -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(cfg.argon2_m_cost)
        .t_cost(cfg.argon2_t_cost)
        .p_cost(cfg.argon2_p_cost)
        .build()
        .with_context(|| {
            format!(
                "invalid Argon2 params derived from config: m_cost={}, t_cost={}, p_cost={}",
                cfg.argon2_m_cost, cfg.argon2_t_cost, cfg.argon2_p_cost
            )
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

async fn run_create_user(args: CreateUserArgs, cfg: &AppConfig) -> Result<()> {
    let raw_email = args.email.ok_or_else(|| anyhow!("missing email"))?;
    let password = args.password.ok_or_else(|| anyhow!("missing password"))?;
    let email = normalize_email(&raw_email).ok_or_else(|| anyhow!("invalid email '{raw_email}'"))?;
    if !password_acceptable(&password) {
        bail!("password must be at least 8 characters");
    }
    let name = args.name.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let argon2 = argon2_from_config(cfg)?;
    let hashed = hash_password(&argon2, &password)?;
    let mut conn = DbConnection::establish(&cfg.database).await?;
    apply_migrations(&mut conn, &cfg.database).await?;
    if get_user_by_email(&mut conn, &email).await?.is_some() {
        bail!("user '{email}' already exists");
    }
    let new_user = models::NewUser {
        email: &email,
        password: &hashed,
        name,
    };
    let user = create_user(&mut conn, &new_user)
        .await
        .with_context(|| format!("failed to create user '{email}'"))?;
    info!(user_id = user.id, "created user from command line");
    println!("User {email} created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn argon2_respects_cli_overrides() {
        let cfg = AppConfig {
            argon2_m_cost: 1024,
            argon2_t_cost: 5,
            argon2_p_cost: 3,
            ..AppConfig::default()
        };

        let argon2 = argon2_from_config(&cfg).expect("argon2");

        let params = argon2.params();
        assert_eq!(params.m_cost(), cfg.argon2_m_cost);
        assert_eq!(params.t_cost(), cfg.argon2_t_cost);
        assert_eq!(params.p_cost(), cfg.argon2_p_cost);
    }

    #[rstest]
    fn argon2_rejects_zero_time_cost() {
        let cfg = AppConfig {
            argon2_m_cost: 1024,
            argon2_t_cost: 0,
            argon2_p_cost: 1,
            ..AppConfig::default()
        };
        let err = argon2_from_config(&cfg).expect_err("must fail");
        assert!(err.to_string().contains("t_cost=0"));
    }

    #[rstest]
    #[case(None, Some("password1".into()), "missing email")]
    #[case(Some("ada@example.com".into()), None, "missing password")]
    #[case(Some("not-an-email".into()), Some("password1".into()), "invalid email")]
    #[case(Some("ada@example.com".into()), Some("short".into()), "at least 8 characters")]
    #[tokio::test]
    async fn run_command_rejects_bad_fields(
        #[case] email: Option<String>,
        #[case] password: Option<String>,
        #[case] expected: &str,
    ) {
        let cfg = AppConfig::default();
        let args = CreateUserArgs {
            email,
            password,
            name: None,
        };

        let err = run_command(Commands::CreateUser(args), &cfg)
            .await
            .expect_err("command must fail");

        assert!(err.to_string().contains(expected));
    }
}
