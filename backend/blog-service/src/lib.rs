/// Blog Service Library
///
/// A server-rendered blog: posts filed under categories and tags, a category
/// panel with per-category post counts (plus the uncategorized bucket), and a
/// post-creation form for signed-in authors.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `models`: Posts, categories, tags and users
/// - `services`: Query layer and use cases
/// - `db`: Repository trait with in-memory and PostgreSQL backends
/// - `render`: askama page templates
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod render;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use actix_middleware::{SessionAuth, SessionUser};
use crypto_core::SessionKeys;
use db::BlogRepository;
use render::Layout;
use services::{AccountService, BlogService};
use std::sync::Arc;

/// Shared application state handed to every handler
pub struct AppState {
    pub config: Config,
    pub repo: Arc<dyn BlogRepository>,
    pub blog: BlogService,
    pub accounts: AccountService,
    pub keys: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(config: Config, repo: Arc<dyn BlogRepository>) -> Result<Self> {
        let keys = Arc::new(SessionKeys::from_secret(
            config.session.secret.as_bytes(),
            config.session.ttl_secs,
        )?);

        Ok(Self {
            blog: BlogService::new(repo.clone(), config.blog.uncategorized_label.clone()),
            accounts: AccountService::new(repo.clone(), keys.clone()),
            repo,
            keys,
            config,
        })
    }

    /// Middleware resolving the session cookie into a `SessionUser`
    pub fn session_auth(&self) -> SessionAuth {
        SessionAuth::new(self.keys.clone(), &self.config.session.cookie_name)
    }

    pub fn layout<'a>(&'a self, viewer: Option<&'a SessionUser>) -> Layout<'a> {
        Layout {
            site_name: &self.config.blog.site_name,
            viewer: viewer.map(|user| user.username.as_str()),
        }
    }
}
