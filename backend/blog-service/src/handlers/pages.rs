/// Landing and about-me pages
use super::html;
use crate::error::Result;
use crate::metrics;
use crate::render;
use crate::AppState;
use actix_middleware::SessionUser;
use actix_web::{web, HttpResponse};

/// `GET /`
pub async fn landing(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
) -> Result<HttpResponse> {
    let posts = state.blog.list_posts().await?;

    let _timer = metrics::time_render("landing");
    let body = render::landing_page(state.layout(viewer.as_ref()), &posts)?;
    Ok(html(body))
}

/// `GET /about_me/`
pub async fn about_me(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
) -> Result<HttpResponse> {
    let body = render::about_me_page(state.layout(viewer.as_ref()))?;
    Ok(html(body))
}
