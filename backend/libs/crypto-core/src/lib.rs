//! Shared credential primitives for the blog backend.
//!
//! - `password`: Argon2id hashing and verification for stored user credentials
//! - `session`: signed session tokens carried in the login cookie

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password, verify_unknown_user};
pub use session::{SessionClaims, SessionKeys};

/// Errors raised by hashing and token operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("session secret must be at least {min} bytes")]
    WeakSecret { min: usize },

    #[error("failed to sign session token: {0}")]
    Sign(String),

    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
