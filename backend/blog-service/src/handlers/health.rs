/// Health endpoints
use crate::AppState;
use actix_web::{web, HttpResponse};

/// `GET /api/v1/health` - pings the configured store
pub async fn health_summary(state: web::Data<AppState>) -> HttpResponse {
    let backend = state.repo.backend();
    match state.repo.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "storage": backend,
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => {
            tracing::error!(error = %e, storage = backend, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "service": "blog-service",
                "storage": backend,
                "error": e.public_message()
            }))
        }
    }
}

/// `GET /api/v1/health/live`
pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
