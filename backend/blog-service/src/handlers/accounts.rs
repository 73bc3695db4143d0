/// Account handlers - login form, login and logout
use super::{html, redirect};
use crate::error::{AppError, Result};
use crate::render;
use crate::AppState;
use actix_middleware::SessionUser;
use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    http::header::ContentType,
    web, HttpResponse,
};
use serde::Deserialize;

const DEFAULT_NEXT: &str = "/blog/";

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => DEFAULT_NEXT,
    }
}

/// `GET /accounts/login/`
pub async fn login_form(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
    query: web::Query<LoginQuery>,
) -> Result<HttpResponse> {
    let next = safe_next(query.next.as_deref());
    let body = render::login_page(state.layout(viewer.as_ref()), next, "", None)?;
    Ok(html(body))
}

/// `POST /accounts/login/`
pub async fn login_submit(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse> {
    let form = form.into_inner();
    let next = safe_next(form.next.as_deref());

    let user = match state.accounts.authenticate(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AppError::InvalidCredentials) => {
            let body = render::login_page(
                state.layout(None),
                next,
                &form.username,
                Some("Please enter a correct username and password."),
            )?;
            return Ok(HttpResponse::Unauthorized()
                .content_type(ContentType::html())
                .body(body));
        }
        Err(e) => return Err(e),
    };

    let token = state.accounts.issue_session(&user)?;
    let session = &state.config.session;
    let cookie = Cookie::build(session.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(session.cookie_secure)
        .max_age(Duration::seconds(state.accounts.session_ttl_secs()))
        .finish();

    let mut response = redirect(next);
    response.add_cookie(&cookie).map_err(|e| {
        AppError::Internal(format!("failed to set session cookie: {}", e))
    })?;
    Ok(response)
}

/// `POST /accounts/logout/`
pub async fn logout(state: web::Data<AppState>) -> Result<HttpResponse> {
    let mut cookie = Cookie::build(state.config.session.cookie_name.clone(), "")
        .path("/")
        .finish();
    cookie.make_removal();

    let mut response = redirect(DEFAULT_NEXT);
    response.add_cookie(&cookie).map_err(|e| {
        AppError::Internal(format!("failed to clear session cookie: {}", e))
    })?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/blog/create_post/")), "/blog/create_post/");
        assert_eq!(safe_next(None), "/blog/");
        assert_eq!(safe_next(Some("https://evil.example/")), "/blog/");
        assert_eq!(safe_next(Some("//evil.example/")), "/blog/");
        assert_eq!(safe_next(Some("/\\evil")), "/blog/");
    }
}
