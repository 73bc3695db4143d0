/// Signed session tokens for browser logins
///
/// Tokens are HS256 JWTs: the blog service is the only party that issues and
/// validates them, so a shared secret is sufficient. The subject is the
/// numeric user id; the username travels alongside so pages can greet the
/// caller without a store lookup.
use crate::{CryptoError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// Minimum secret length accepted for signing
pub const MIN_SECRET_LEN: usize = 32;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject (user id as decimal string)
    pub sub: String,
    /// Username at the time of login
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| CryptoError::InvalidToken(format!("malformed subject '{}'", self.sub)))
    }
}

/// Signing and verification keys plus token lifetime
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8], ttl_secs: i64) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CryptoError::WeakSecret {
                min: MIN_SECRET_LEN,
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_secs),
        })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Issue a token for the given user
    pub fn issue(&self, user_id: i64, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| CryptoError::Sign(e.to_string()))
    }

    /// Validate signature and expiry, returning the claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            CryptoError::InvalidToken(e.to_string())
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_and_validate() {
        let keys = SessionKeys::from_secret(SECRET, 3600).unwrap();
        let token = keys.issue(7, "Trump").unwrap();

        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.username, "Trump");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = SessionKeys::from_secret(b"short", 3600).unwrap_err();
        assert!(matches!(err, CryptoError::WeakSecret { min: 32 }));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let keys = SessionKeys::from_secret(SECRET, 3600).unwrap();
        let other = SessionKeys::from_secret(b"fedcba9876543210fedcba9876543210", 3600).unwrap();
        let token = other.issue(1, "James").unwrap();

        assert!(matches!(
            keys.validate(&token),
            Err(CryptoError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = SessionKeys::from_secret(SECRET, -60).unwrap();
        let token = keys.issue(1, "James").unwrap();
        assert!(keys.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = SessionKeys::from_secret(SECRET, 3600).unwrap();
        assert!(keys.validate("not.a.token").is_err());
    }
}
