/// Account service - registration, credential checks and session tokens
use crate::db::BlogRepository;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{Registration, User};
use actix_middleware::SessionUser;
use crypto_core::{hash_password, verify_password, verify_unknown_user, SessionKeys};
use std::sync::Arc;
use validator::Validate;

pub struct AccountService {
    repo: Arc<dyn BlogRepository>,
    keys: Arc<SessionKeys>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn BlogRepository>, keys: Arc<SessionKeys>) -> Self {
        Self { repo, keys }
    }

    /// Create a user with an Argon2id password hash
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let registration = Registration {
            username: username.to_string(),
            password: password.to_string(),
        };
        registration.validate()?;

        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        let user = self.repo.create_user(username, &password_hash).await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Check a username/password pair
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<SessionUser> {
        let Some(user) = self.repo.find_user_by_username(username).await? else {
            let password = password.to_string();
            tokio::task::spawn_blocking(move || verify_unknown_user(&password))
                .await
                .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))??;

            metrics::record_login(false);
            tracing::warn!(%username, "login failed: unknown user");
            return Err(AppError::InvalidCredentials);
        };

        let password = password.to_string();
        let stored = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))??;

        metrics::record_login(verified);
        if !verified {
            tracing::warn!(%username, "login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, %username, "login succeeded");
        Ok(SessionUser {
            user_id: user.id,
            username: user.username,
        })
    }

    /// Signed token for the session cookie
    pub fn issue_session(&self, user: &SessionUser) -> Result<String> {
        Ok(self.keys.issue(user.user_id, &user.username)?)
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.keys.ttl_secs()
    }
}
