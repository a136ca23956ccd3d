use actix_web::{
    web::{self, Json},
    HttpResponse,
};

use crate::{
    error::ApiError,
    models::{Game, GameId, SimilarGamesQuery, SimilarGamesResponse},
    services::RecommendationService,
};

const DEFAULT_SIMILAR_LIMIT: usize = 5;

pub fn games_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/games/similar").route(web::post().to(similar_to_record)))
        .service(web::resource("/games/{game_id}/similar").route(web::get().to(similar_games)));
}

/// Games most similar to a catalog game. Unknown games give an empty list.
pub async fn similar_games(
    path: web::Path<GameId>,
    query: web::Query<SimilarGamesQuery>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let game_id = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);

    let similar_games = recommendation_service.similar_games(game_id, limit)?;

    Ok(HttpResponse::Ok().json(SimilarGamesResponse {
        game_id,
        similar_games,
    }))
}

/// Catalog games most similar to a posted game record, which need not be in
/// the catalog. Categories and mechanics the model has never seen are ignored.
pub async fn similar_to_record(
    game: Json<Game>,
    query: web::Query<SimilarGamesQuery>,
    recommendation_service: web::Data<RecommendationService>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    let similar_games = recommendation_service.similar_to_game(&game, limit)?;

    Ok(HttpResponse::Ok().json(SimilarGamesResponse {
        game_id: game.game_id,
        similar_games,
    }))
}
