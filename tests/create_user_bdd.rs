//! BDD-style integration tests for the create-user command.
//!
//! These tests exercise the CLI-driven create-user workflow against a temporary
//! `SQLite` database, verifying both successful account creation and error
//! handling.

#![cfg(feature = "sqlite")]

use std::cell::RefCell;

use anyhow::{Context, Result, anyhow};
use diesel_async::AsyncConnection;
use lista::{
    db::{self, DbConnection},
    server::{self, AppConfig, Commands, CreateUserArgs, ResolvedCli},
};
use rstest::fixture;
use rstest_bdd::{assert_step_err, assert_step_ok};
use rstest_bdd_macros::{given, scenarios, then, when};
use tempfile::TempDir;

type CommandResult = Result<()>;

struct CreateUserWorld {
    _temp_dir: TempDir,
    config: AppConfig,
    outcome: RefCell<Option<CommandResult>>,
}

impl CreateUserWorld {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("failed to create tempdir for test")?;
        let mut config = test_util::test_config(&temp_dir);
        config.database = temp_dir
            .path()
            .join("bdd.lista.db")
            .to_string_lossy()
            .into_owned();
        Ok(Self {
            _temp_dir: temp_dir,
            config,
            outcome: RefCell::new(None),
        })
    }

    async fn run_command(&self, email: String, password: Option<String>) {
        let args = CreateUserArgs {
            email: Some(email),
            password,
            name: None,
        };
        let cli = ResolvedCli {
            config: self.config.clone(),
            command: Some(Commands::CreateUser(args)),
        };
        let result = server::run_with_cli(cli).await;
        self.outcome.borrow_mut().replace(result);
    }

    async fn assert_user_exists(&self, email: &str) -> Result<()> {
        let mut conn = DbConnection::establish(&self.config.database)
            .await
            .context("failed to establish db connection")?;
        let fetched = db::get_user_by_email(&mut conn, email)
            .await
            .context("failed to query user")?;
        match fetched {
            Some(user) if user.email == email => Ok(()),
            other => Err(anyhow!(
                "expected user '{email}' to exist, found {:?}",
                other.map(|u| u.email)
            )),
        }
    }

    fn assert_failure_contains(&self, message: &str) {
        let outcome_ref = self.outcome.borrow();
        let Some(outcome) = outcome_ref.as_ref() else {
            panic!("command not executed");
        };
        let status = outcome.as_ref().map_err(ToString::to_string);
        let text = assert_step_err!(status);
        assert!(
            text.contains(message),
            "expected error to contain '{message}', got '{text}'"
        );
    }
}

#[fixture]
fn world() -> CreateUserWorld {
    CreateUserWorld::new().unwrap_or_else(|err| panic!("failed to create test world: {err}"))
}

#[given("a temporary sqlite database")]
fn given_temp_db(world: &CreateUserWorld) {
    let path = std::path::Path::new(&world.config.database);
    assert!(path.parent().is_some_and(std::path::Path::exists));
}

#[given("server configuration bound to that database")]
fn given_config_bound(world: &CreateUserWorld) {
    assert!(
        world.config.database.ends_with("bdd.lista.db"),
        "temporary sqlite database path must end with bdd.lista.db"
    );
}

#[when("the operator runs create-user with email \"{email}\" and password \"{password}\"")]
async fn when_run_with_password(world: &CreateUserWorld, email: String, password: String) {
    world.run_command(email, Some(password)).await;
}

#[when("the operator runs create-user with email \"{email}\" and no password")]
async fn when_run_without_password(world: &CreateUserWorld, email: String) {
    world.run_command(email, None).await;
}

#[then("the command completes successfully")]
fn then_success(world: &CreateUserWorld) {
    let outcome_ref = world.outcome.borrow();
    let Some(outcome) = outcome_ref.as_ref() else {
        panic!("command not executed");
    };
    let status = outcome.as_ref().map_err(ToString::to_string);
    assert_step_ok!(status);
}

#[then("the database contains a user with email \"{email}\"")]
async fn then_user_exists(world: &CreateUserWorld, email: String) {
    if let Err(err) = world.assert_user_exists(&email).await {
        panic!("user existence check failed: {err}");
    }
}

#[then("the command fails with message \"{message}\"")]
fn then_failure(world: &CreateUserWorld, message: String) {
    world.assert_failure_contains(&message);
}

scenarios!(
    "tests/features/create_user_command.feature",
    runtime = "tokio-current-thread",
    fixtures = [world: CreateUserWorld]
);
