//! # Password hashing and verification: Argon2id
//!
//! Credential users never have their password stored in clear:
//!
//! - [`hash_password`] generates a random salt via [`OsRng`], hashes with the default
//!   Argon2id parameters and returns a PHC-format string
//!   (`$argon2id$v=19$m=19456,t=2,p=1$...`) for the `password` column.
//! - [`verify_password`] parses a stored PHC string and checks a candidate against it.
//!   `Ok(false)` is a mismatch; `Err` means the stored hash itself is malformed.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
    #[error("password task failed: {0}")]
    Task(String),
}

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a PHC-format hash string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| PasswordError::Malformed(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// [`hash_password`] on the blocking pool, off the async workers.
pub async fn hash_password_blocking(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}

/// [`verify_password`] on the blocking pool, off the async workers.
pub async fn verify_password_blocking(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let (password, hash) = (password.to_owned(), hash.to_owned());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?
}
