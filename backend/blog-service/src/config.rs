/// Configuration management for the blog service
///
/// All settings come from environment variables (a `.env` file is loaded by
/// the binary before this runs). Development gets working defaults; production
/// refuses to start without an explicit session secret.
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// Label shown for posts without a category
pub const DEFAULT_UNCATEGORIZED_LABEL: &str = "미분류";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Login session configuration
    pub session: SessionConfig,
    /// Site presentation settings
    pub blog: BlogConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// Actix worker threads
    pub workers: usize,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL URL; `None` selects the in-memory store
    pub url: Option<String>,
    /// Max connections in pool
    pub max_connections: u32,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret for session tokens
    pub secret: String,
    pub ttl_secs: i64,
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only)
    pub cookie_secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .field("cookie_name", &self.cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    /// Brand text in the navigation bar
    pub site_name: String,
    /// Label of the bucket for posts without a category
    pub uncategorized_label: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            site_name: "Internet Programming".to_string(),
            uncategorized_label: DEFAULT_UNCATEGORIZED_LABEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let secret = match std::env::var("SESSION_SECRET") {
            Ok(value) if value.len() >= crypto_core::session::MIN_SECRET_LEN => value,
            Ok(_) => {
                return Err(format!(
                    "SESSION_SECRET must be at least {} bytes",
                    crypto_core::session::MIN_SECRET_LEN
                ))
            }
            Err(_) if production => {
                return Err("SESSION_SECRET must be set in production".to_string())
            }
            Err(_) => {
                tracing::warn!("SESSION_SECRET not set; generated an ephemeral secret, logins will not survive a restart");
                random_secret()
            }
        };

        let defaults = BlogConfig::default();

        Ok(Config {
            app: AppConfig {
                host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("BLOG_SERVICE_PORT", 8000)?,
                workers: parse_env_or_default("BLOG_SERVICE_WORKERS", 4)?,
                json_logs: json_logs_from_env(),
                env: app_env,
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
                max_connections: parse_env_or_default("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            session: SessionConfig {
                secret,
                ttl_secs: parse_env_or_default("SESSION_TTL_SECS", 60 * 60 * 24 * 14)?,
                cookie_name: std::env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| actix_middleware::DEFAULT_SESSION_COOKIE.to_string()),
                cookie_secure: parse_env_or_default("SESSION_COOKIE_SECURE", production)?,
            },
            blog: BlogConfig {
                site_name: std::env::var("BLOG_SITE_NAME").unwrap_or(defaults.site_name),
                uncategorized_label: std::env::var("BLOG_UNCATEGORIZED_LABEL")
                    .ok()
                    .filter(|label| !label.trim().is_empty())
                    .unwrap_or(defaults.uncategorized_label),
            },
        })
    }

    /// Development defaults with an explicit session secret and in-memory storage
    pub fn local(secret: impl Into<String>) -> Self {
        Config {
            app: AppConfig {
                env: "development".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8000,
                workers: 1,
                json_logs: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
            },
            session: SessionConfig {
                secret: secret.into(),
                ttl_secs: 60 * 60 * 24 * 14,
                cookie_name: actix_middleware::DEFAULT_SESSION_COOKIE.to_string(),
                cookie_secure: false,
            },
            blog: BlogConfig::default(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

/// `LOG_FORMAT=json` selects JSON log lines; read before the rest of the config
pub fn json_logs_from_env() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}
