/// HTTP handlers for blog-service
///
/// - Blog: post list, detail, category/tag filters, post creation
/// - Accounts: login and logout with the session cookie
/// - Pages: landing and about-me pages
/// - Health: liveness and storage health
pub mod accounts;
pub mod blog;
pub mod health;
pub mod pages;

use crate::error::LOGIN_URL;
use crate::metrics;
use actix_web::{
    http::header::{self, ContentType},
    web, HttpResponse,
};

/// Largest urlencoded form body accepted on blog pages (2.5 MiB)
pub const MAX_FORM_BYTES: usize = 2_621_440;

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::landing))
        .route("/about_me/", web::get().to(pages::about_me))
        .service(
            web::scope("/blog")
                .app_data(web::FormConfig::default().limit(MAX_FORM_BYTES))
                .route("/", web::get().to(blog::post_list))
                // registered before "/{post_id}/" so the literal path wins
                .service(
                    web::resource("/create_post/")
                        .route(web::get().to(blog::create_post_form))
                        .route(web::post().to(blog::create_post_submit)),
                )
                .route("/category/{slug}/", web::get().to(blog::category))
                .route("/tag/{slug}/", web::get().to(blog::tag))
                .route("/{post_id}/", web::get().to(blog::post_detail)),
        )
        .service(
            web::resource("/accounts/login/")
                .route(web::get().to(accounts::login_form))
                .route(web::post().to(accounts::login_submit)),
        )
        .route("/accounts/logout/", web::post().to(accounts::logout))
        .route("/api/v1/health", web::get().to(health::health_summary))
        .route("/api/v1/health/live", web::get().to(health::liveness_check))
        .route("/metrics", web::get().to(metrics::serve_metrics));
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Send an anonymous caller to the login form, returning to `next` afterwards
pub(crate) fn login_redirect(next: &str) -> HttpResponse {
    redirect(&format!("{}?next={}", LOGIN_URL, next))
}
