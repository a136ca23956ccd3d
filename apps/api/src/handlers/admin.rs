use actix_web::{
    web::{self, Json},
    HttpResponse,
};
use log::info;

use crate::{
    error::ApiError,
    models::{GameDataUpload, TrainingData, TrainingResponse},
    services::RecommendationService,
};

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/admin/train").route(web::post().to(train_model)))
        .service(web::resource("/admin/games/upload").route(web::post().to(upload_games)));
}

/// Starts a retrain in the background and answers immediately
pub async fn train_model(
    training_data: Json<TrainingData>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    training_data.validate()?;
    let TrainingData {
        games,
        user_interactions,
    } = training_data.into_inner();
    let games_count = games.len();
    let interactions = user_interactions.unwrap_or_default();
    let interactions_count = interactions.len();

    info!("Starting training with {} games", games_count);
    recommendation_service.train_in_background(games, interactions)?;

    Ok(HttpResponse::Ok().json(TrainingResponse {
        status: "training_started".to_string(),
        message: format!("Training started with {} games", games_count),
        games_count,
        interactions_count: Some(interactions_count),
    }))
}

/// Replaces the catalog and retrains before answering
pub async fn upload_games(
    game_data: Json<GameDataUpload>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    game_data.validate()?;
    let games = game_data.into_inner().games;
    info!("Uploading {} games", games.len());

    let games_count = recommendation_service.train(games, Vec::new()).await?;

    Ok(HttpResponse::Ok().json(TrainingResponse {
        status: "success".to_string(),
        message: format!("{} games uploaded and model retrained", games_count),
        games_count,
        interactions_count: None,
    }))
}
