/// Error types for the blog service
///
/// Every failure a handler can surface maps onto an HTTP status here. Pages
/// get a small HTML error document; internal details are logged, not shown.
use crate::render;
use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use thiserror::Error;

/// Result type for blog-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Where anonymous callers are sent when a page requires a login
pub const LOGIN_URL: &str = "/accounts/login/";

#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown post id, category slug or tag slug
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation needs an authenticated caller
    #[error("Login required")]
    LoginRequired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Submitted form data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate slug/name/username, or a delete blocked by references
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to show to the browser
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                "Something went wrong on our side.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired => StatusCode::FOUND,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::LoginRequired = self {
            return HttpResponse::Found()
                .insert_header((header::LOCATION, LOGIN_URL))
                .finish();
        }

        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let message = self.public_message();
        let body = render::error_page(status.as_u16(), &message).unwrap_or(message);

        HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::BadRequest(format!("referenced record does not exist: {}", db.message()))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {}", err))
    }
}

impl From<crypto_core::CryptoError> for AppError {
    fn from(err: crypto_core::CryptoError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(describe_validation_errors(&errors).join("; "))
    }
}

/// Flatten field errors into "field: message" lines, sorted by field name
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: invalid value ({})", field, e.code),
            })
        })
        .collect()
}
