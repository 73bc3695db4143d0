/// Blog handlers - post list, detail, filters and post creation
use super::{html, login_redirect, redirect};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::NewPostForm;
use crate::render::{self, Sidebar};
use crate::services::AuthContext;
use crate::AppState;
use actix_middleware::SessionUser;
use actix_web::{http::header::ContentType, web, HttpResponse};

pub const CREATE_POST_PATH: &str = "/blog/create_post/";

/// `GET /blog/`
pub async fn post_list(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
) -> Result<HttpResponse> {
    let counts = state.blog.category_post_counts().await?;
    let posts = state.blog.list_posts().await?;

    let _timer = metrics::time_render("post_list");
    let sidebar = Sidebar::new(&counts, state.blog.uncategorized_label());
    let body = render::post_list_page(state.layout(viewer.as_ref()), &sidebar, &posts)?;
    Ok(html(body))
}

/// `GET /blog/{post_id}/`
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let post_id = path.into_inner();
    let post = state.blog.post_detail(post_id).await?;
    let counts = state.blog.category_post_counts().await?;

    let _timer = metrics::time_render("post_detail");
    let sidebar = Sidebar::new(&counts, state.blog.uncategorized_label());
    let body = render::post_detail_page(state.layout(viewer.as_ref()), &sidebar, &post)?;
    Ok(html(body))
}

/// `GET /blog/category/{slug}/`
pub async fn category(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let listing = state.blog.posts_by_category(&slug).await?;
    let counts = state.blog.category_post_counts().await?;

    let _timer = metrics::time_render("category");
    let sidebar = Sidebar::new(&counts, state.blog.uncategorized_label());
    let body = render::category_page(
        state.layout(viewer.as_ref()),
        &sidebar,
        &listing.name,
        &listing.posts,
    )?;
    Ok(html(body))
}

/// `GET /blog/tag/{slug}/`
pub async fn tag(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let slug = path.into_inner();
    let listing = state.blog.posts_by_tag(&slug).await?;
    let counts = state.blog.category_post_counts().await?;

    let _timer = metrics::time_render("tag");
    let sidebar = Sidebar::new(&counts, state.blog.uncategorized_label());
    let body = render::tag_page(
        state.layout(viewer.as_ref()),
        &sidebar,
        &listing.tag.name,
        &listing.posts,
    )?;
    Ok(html(body))
}

/// `GET /blog/create_post/`
pub async fn create_post_form(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
) -> Result<HttpResponse> {
    let Some(user) = viewer else {
        return Ok(login_redirect(CREATE_POST_PATH));
    };

    let _timer = metrics::time_render("post_form");
    let body = render::post_form_page(state.layout(Some(&user)), &NewPostForm::default(), &[])?;
    Ok(html(body))
}

/// `POST /blog/create_post/`
///
/// Redirects to the new post on success; an invalid form comes back as 400
/// with the submitted values kept.
pub async fn create_post_submit(
    state: web::Data<AppState>,
    viewer: Option<SessionUser>,
    form: web::Form<NewPostForm>,
) -> Result<HttpResponse> {
    let auth = AuthContext::from(viewer);
    let form = form.into_inner();

    match state.blog.create_post(&auth, form.clone()).await {
        Ok(post) => Ok(redirect(&post.url())),
        Err(AppError::LoginRequired) => Ok(login_redirect(CREATE_POST_PATH)),
        Err(AppError::Validation(message)) => {
            let errors: Vec<String> = message.split("; ").map(str::to_string).collect();
            let body = render::post_form_page(state.layout(auth.user()), &form, &errors)?;
            Ok(HttpResponse::BadRequest()
                .content_type(ContentType::html())
                .body(body))
        }
        Err(e) => Err(e),
    }
}
