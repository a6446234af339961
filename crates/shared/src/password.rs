//! Operator credential hashing using Argon2id.
//!
//! The admin password is never stored or configured in plaintext. Operators
//! generate a PHC string with [`hash_password`] (exposed through the
//! `prize-wheel hash-password` command) and place it in
//! `admin.password_hash`; logins are checked with [`verify_password`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// OWASP 2024 baseline: 19 MiB, 2 iterations, 1 lane, 256-bit output.
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn argon2id() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password into a self-describing PHC string.
///
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("operator-secret").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2id()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC string.
///
/// The parameters embedded in `hash` are used, so hashes produced with older
/// parameters keep verifying. Comparison is constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Returns true if `hash` parses as a PHC string.
///
/// Used at config load so a mistyped `admin.password_hash` fails fast instead
/// of rejecting every login.
pub fn is_phc_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}
