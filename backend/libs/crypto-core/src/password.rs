/// Password hashing and verification using Argon2id
use crate::{CryptoError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password with a fresh random salt.
///
/// Returns a PHC-formatted string suitable for the `users.password_hash` column.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CryptoError::Hash(e.to_string()))
}

/// Verify a password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only a corrupt stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| CryptoError::MalformedHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CryptoError::Hash(e.to_string())),
    }
}

/// Well-formed Argon2id hash no password maps to, using the default cost
/// parameters of `hash_password`.
const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$a2+uTp9cjviHe35iCZUDdA$Z+zH7vxJOWdH9PQW7xkv9gBlOJTp9EbEi5q10Ted1eA";

/// Run a full verification that always fails.
///
/// Used when no stored hash exists so the rejection costs as much as a wrong
/// password does.
pub fn verify_unknown_user(password: &str) -> Result<bool> {
    verify_password(password, UNMATCHABLE_HASH).map(|_| false)
}
