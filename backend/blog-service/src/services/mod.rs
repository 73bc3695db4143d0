/// Business logic layer for blog-service
///
/// - Blog service: category counts, filtered listings, post creation
/// - Account service: registration, login, session tokens
///
/// The caller identity is passed in explicitly as an [`AuthContext`]; nothing
/// here reads request state.
pub mod accounts;
pub mod blog;

pub use accounts::AccountService;
pub use blog::{BlogService, CategoryListing, TagListing};

use actix_middleware::SessionUser;

/// Who is performing an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    User(SessionUser),
}

impl AuthContext {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::User(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

impl From<Option<SessionUser>> for AuthContext {
    fn from(user: Option<SessionUser>) -> Self {
        user.map_or(AuthContext::Anonymous, AuthContext::User)
    }
}
