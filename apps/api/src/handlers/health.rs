use actix_web::{get, web, HttpResponse};

use crate::{models::HealthResponse, services::RecommendationService};

#[get("/")]
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Board game recommendation API is online",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational"
    }))
}

#[get("/health")]
pub async fn health_check(
    recommendation_service: web::Data<RecommendationService>,
) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: recommendation_service.is_trained(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
