//! # Actix Middleware Library
//!
//! Middleware shared by the blog backend's Actix services
//!
//! ## Modules
//! - `session_auth`: resolves the caller identity from the session cookie
//! - `logging`: structured per-request logging

pub mod logging;
pub mod session_auth;

pub use logging::Logging;
pub use session_auth::{SessionAuth, SessionUser, DEFAULT_SESSION_COOKIE};
