//! Salted Argon2 password hashing.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password cannot be empty")]
    Empty,

    #[error("invalid stored password hash: {0}")]
    InvalidHash(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a plain-text password into a PHC string with a fresh random salt.
///
/// # Errors
/// Returns [`PasswordError::Empty`] for an empty password, or
/// [`PasswordError::Hash`] if Argon2 fails.
#[instrument(skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.is_empty() {
        return Err(PasswordError::Empty);
    }

    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!("Argon2 password hashing failed: {err}");
            PasswordError::Hash(err.to_string())
        })
}

/// Check a plain-text password against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only a corrupt hash or an Argon2 failure is an error.
///
/// # Errors
/// Returns [`PasswordError::InvalidHash`] if the stored hash cannot be parsed.
#[instrument(skip(stored_hash, password), err(Display))]
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, PasswordError> {
    if password.is_empty() {
        return Ok(false);
    }

    let parsed = PasswordHash::new(stored_hash).map_err(|err| {
        error!("Failed to parse stored password hash: {err}");
        PasswordError::InvalidHash(err.to_string())
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            debug!("Password mismatch");
            Ok(false)
        }
        Err(err) => Err(PasswordError::Hash(err.to_string())),
    }
}
