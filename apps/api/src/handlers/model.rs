use actix_web::{get, web, HttpResponse};

use crate::services::RecommendationService;

/// Current model status and shape
#[get("/model/info")]
pub async fn model_info(recommendation_service: web::Data<RecommendationService>) -> HttpResponse {
    HttpResponse::Ok().json(recommendation_service.model_info())
}
