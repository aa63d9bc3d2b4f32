//! Account credential helpers.
//!
//! Passwords are stored as Argon2 PHC strings. Emails are normalised before
//! they reach the database so lookups are case-insensitive.

use argon2::{
    Argon2,
    password_hash::{
        Error as HashError,
        PasswordHash,
        PasswordHasher,
        PasswordVerifier,
        SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Failures raised while hashing or checking a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The Argon2 hasher rejected its input.
    #[error("password hashing failed: {0}")]
    Hash(HashError),
    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(HashError),
}

/// Hash `pw` with a fresh random salt.
///
/// # Errors
/// Returns [`PasswordError::Hash`] if Argon2 rejects the input.
pub fn hash_password(argon2: &Argon2<'_>, pw: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(pw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Check `pw` against a stored PHC string.
///
/// The cost parameters embedded in the hash are used, so hashes created under
/// older settings still verify.
///
/// # Errors
/// Returns [`PasswordError::MalformedHash`] if `hash` cannot be parsed.
pub fn verify_password(argon2: &Argon2<'_>, hash: &str, pw: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordError::MalformedHash)?;
    Ok(argon2.verify_password(pw.as_bytes(), &parsed).is_ok())
}

/// Trim and lowercase an email address, rejecting obviously malformed input.
///
/// Returns `None` when the result is empty or lacks an `@` between a local
/// part and a domain.
#[must_use]
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return None;
    }
    Some(email)
}

/// Whether `pw` satisfies the minimum length policy.
#[must_use]
pub fn password_acceptable(pw: &str) -> bool { pw.chars().count() >= MIN_PASSWORD_LEN }
