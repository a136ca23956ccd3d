use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use log::info;

use crate::{
    error::ApiError,
    models::{
        validate_limit, Interaction, RecommendationRequest, RecommendationResponse,
        SimpleRecommendationQuery, UserData, MODEL_VERSION,
    },
    services::RecommendationService,
};

pub fn recommendations_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recommendations").route(web::post().to(get_recommendations)))
        .service(
            web::resource("/recommendations/simple")
                .route(web::post().to(get_simple_recommendations)),
        )
        .service(
            web::resource("/test/recommendations").route(web::post().to(test_recommendations)),
        );
}

/// Personalized recommendations for a user's purchase history
pub async fn get_recommendations(
    request: Json<RecommendationRequest>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    info!(
        "Recommendation request for user {}",
        request.user_data.user_id
    );

    let recommendations = recommendation_service.recommend(
        &request.user_data,
        request.num_recommendations,
        request.exclude_owned,
    );

    Ok(HttpResponse::Ok().json(RecommendationResponse {
        user_id: request.user_data.user_id,
        recommendations,
        model_version: MODEL_VERSION.to_string(),
    }))
}

/// Bare recommendation list, owned games always excluded
pub async fn get_simple_recommendations(
    user_data: Json<UserData>,
    query: web::Query<SimpleRecommendationQuery>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.num_recommendations.unwrap_or(5);
    validate_limit(limit)?;
    user_data.validate()?;

    let recommendations = recommendation_service.recommend(&user_data, limit, true);
    Ok(HttpResponse::Ok().json(recommendations))
}

/// Runs a canned user through the normal pipeline
pub async fn test_recommendations(
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let test_user = UserData {
        user_id: 999,
        purchases: vec![
            Interaction::rated(102, 4.5).with_playtime(10.0),
            Interaction::rated(105, 4.0).with_playtime(5.0),
            Interaction::rated(108, 5.0).with_playtime(20.0),
        ],
        age: None,
        preferred_player_count: None,
    };

    let recommendations = recommendation_service.recommend(&test_user, 5, true);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "test_user_id": test_user.user_id,
        "test_purchases": test_user.purchases.iter().map(|p| p.game_id).collect::<Vec<_>>(),
        "recommendations": recommendations,
    })))
}
