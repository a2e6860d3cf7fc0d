use actix_web::{get, web, HttpResponse, Responder};
use finance_repo::HealthCheck;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

#[get("/health/")]
pub async fn health_check(backend: web::Data<Arc<dyn HealthCheck>>) -> impl Responder {
    if backend.check().await {
        HttpResponse::Ok().json(json!({ "status": "ok" }))
    } else {
        warn!("Storage backend is unavailable");
        HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
    }
}
