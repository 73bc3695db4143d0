//! Prometheus metrics for blog-service.
//!
//! Exposes blog collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Posts stored through the create-post use case.
    pub static ref POSTS_CREATED_TOTAL: IntCounter = register_int_counter!(
        "blog_posts_created_total",
        "Total posts created by authenticated authors"
    )
    .expect("failed to register blog_posts_created_total");

    /// Login attempts by outcome (success/failure).
    pub static ref LOGIN_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blog_login_attempts_total",
        "Login attempts segmented by result",
        &["result"]
    )
    .expect("failed to register blog_login_attempts_total");

    /// Time spent rendering HTML pages by page kind.
    pub static ref PAGE_RENDER_SECONDS: HistogramVec = register_histogram_vec!(
        "blog_page_render_seconds",
        "HTML page render duration segmented by page",
        &["page"]
    )
    .expect("failed to register blog_page_render_seconds");
}

pub fn record_post_created() {
    POSTS_CREATED_TOTAL.inc();
}

pub fn record_login(success: bool) {
    let result = if success { "success" } else { "failure" };
    LOGIN_ATTEMPTS_TOTAL.with_label_values(&[result]).inc();
}

/// Start a render timer; the observation is recorded when the guard drops.
pub fn time_render(page: &str) -> prometheus::HistogramTimer {
    PAGE_RENDER_SECONDS.with_label_values(&[page]).start_timer()
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
