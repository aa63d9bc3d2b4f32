//! Utilities for integration tests.
//!
//! The `test-util` crate builds a fully migrated application backed by a
//! temporary `SQLite` database and drives it in-process through
//! `tower::ServiceExt::oneshot`, so tests exercise the real router, extractors
//! and error mapping without binding a socket.

#[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))]
compile_error!("Choose either sqlite or postgres, not both");

#[cfg(feature = "sqlite")]
mod harness;

#[cfg(feature = "sqlite")]
pub use harness::{PASSWORD, TestApp, TestResponse, test_config};

/// Error type used by fixtures.
pub type AnyError = anyhow::Error;
