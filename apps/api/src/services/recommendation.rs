use actix_web::web;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{RecommenderError, Result};
use crate::ml::{
    FallbackChain, ModelDescription, Recommendation, RecommendationEngine, RecommendationStrategy,
    UserRequest,
};
use crate::models::{
    round_score, Game, GameId, GameRecommendation, Interaction, ModelInfoResponse,
    SimilarGameEntry, UserData,
};

struct StaticPick {
    game_id: GameId,
    name: &'static str,
    score: f64,
    reason: &'static str,
}

// Last resort when no trained catalog is available
static STATIC_PICKS: Lazy<Vec<StaticPick>> = Lazy::new(|| {
    vec![
        StaticPick {
            game_id: 101,
            name: "Pandemic",
            score: 0.85,
            reason: "Popular game - cooperative",
        },
        StaticPick {
            game_id: 102,
            name: "Catan",
            score: 0.82,
            reason: "Popular game - strategy",
        },
        StaticPick {
            game_id: 103,
            name: "Ticket to Ride",
            score: 0.80,
            reason: "Popular game - family",
        },
        StaticPick {
            game_id: 104,
            name: "7 Wonders",
            score: 0.78,
            reason: "Popular game - drafting",
        },
        StaticPick {
            game_id: 105,
            name: "Azul",
            score: 0.75,
            reason: "Popular game - abstract",
        },
    ]
});

/// Engine first (personalized, then popularity), static list last.
struct EngineStrategy<'e> {
    engine: &'e RecommendationEngine,
}

impl RecommendationStrategy for EngineStrategy<'_> {
    fn name(&self) -> &'static str {
        "engine"
    }

    fn recommend(
        &self,
        request: &UserRequest<'_>,
    ) -> std::result::Result<Vec<Recommendation>, RecommenderError> {
        self.engine
            .recommend_for_user(request.purchases, request.limit, request.exclude_owned)
    }
}

struct StaticListStrategy;

impl RecommendationStrategy for StaticListStrategy {
    fn name(&self) -> &'static str {
        "static"
    }

    fn recommend(
        &self,
        request: &UserRequest<'_>,
    ) -> std::result::Result<Vec<Recommendation>, RecommenderError> {
        warn!("Using static fallback recommendations");
        let owned: HashSet<GameId> = request.purchases.iter().map(|p| p.game_id).collect();

        Ok(STATIC_PICKS
            .iter()
            .filter(|pick| !(request.exclude_owned && owned.contains(&pick.game_id)))
            .take(request.limit)
            .map(|pick| Recommendation {
                game_id: pick.game_id,
                score: pick.score,
                reason: pick.reason.to_string(),
            })
            .collect())
    }
}

/// Request-facing wrapper around the shared engine.
#[derive(Clone)]
pub struct RecommendationService {
    engine: Arc<RecommendationEngine>,
}

impl RecommendationService {
    pub fn new(engine: Arc<RecommendationEngine>) -> Self {
        Self { engine }
    }

    pub fn is_trained(&self) -> bool {
        self.engine.is_trained()
    }

    /// Recommendations for a user. Never fails: model problems degrade to
    /// popular games and then to the static list.
    pub fn recommend(
        &self,
        user: &UserData,
        limit: usize,
        exclude_owned: bool,
    ) -> Vec<GameRecommendation> {
        let request = UserRequest {
            purchases: &user.purchases,
            limit,
            exclude_owned,
        };

        let recommendations = FallbackChain::new()
            .then(EngineStrategy {
                engine: &self.engine,
            })
            .then(StaticListStrategy)
            .run(&request)
            .map(|outcome| {
                info!(
                    user_id = user.user_id,
                    strategy = outcome.strategy,
                    "Generated {} recommendations",
                    outcome.recommendations.len()
                );
                outcome.recommendations
            })
            .unwrap_or_else(|e| {
                error!("Error generating recommendations: {}", e);
                Vec::new()
            });

        recommendations
            .into_iter()
            .map(|r| GameRecommendation {
                game_name: self.game_name(r.game_id),
                game_id: r.game_id,
                score: round_score(r.score),
                reason: Some(r.reason),
            })
            .collect()
    }

    pub fn similar_games(&self, game_id: GameId, limit: usize) -> Result<Vec<SimilarGameEntry>> {
        Ok(self
            .engine
            .similar_items(game_id, limit)?
            .into_iter()
            .map(|s| SimilarGameEntry {
                game_id: s.game_id,
                similarity_score: round_score(s.similarity),
            })
            .collect())
    }

    pub fn similar_to_game(&self, game: &Game, limit: usize) -> Result<Vec<SimilarGameEntry>> {
        Ok(self
            .engine
            .similar_to_game(game, limit)?
            .into_iter()
            .map(|s| SimilarGameEntry {
                game_id: s.game_id,
                similarity_score: round_score(s.similarity),
            })
            .collect())
    }

    /// Trains on the blocking pool and waits for the new generation.
    pub async fn train(&self, games: Vec<Game>, interactions: Vec<Interaction>) -> Result<usize> {
        if games.is_empty() {
            return Err(RecommenderError::EmptyTrainingSet.into());
        }

        let engine = self.engine.clone();
        let generation =
            web::block(move || engine.train(games, Some(interactions.as_slice()))).await??;
        Ok(generation.len())
    }

    /// Starts training without waiting for it. A later run that finishes
    /// last simply replaces this one.
    pub fn train_in_background(
        &self,
        games: Vec<Game>,
        interactions: Vec<Interaction>,
    ) -> Result<()> {
        if games.is_empty() {
            return Err(RecommenderError::EmptyTrainingSet.into());
        }

        let service = self.clone();
        actix_web::rt::spawn(async move {
            match service.train(games, interactions).await {
                Ok(count) => info!("Background training finished with {} games", count),
                Err(e) => error!("Background training failed: {}", e),
            }
        });
        Ok(())
    }

    /// Catalog name, then the static list, then a generic label.
    pub fn game_name(&self, game_id: GameId) -> String {
        self.engine
            .game(game_id)
            .and_then(|game| game.name)
            .or_else(|| {
                STATIC_PICKS
                    .iter()
                    .find(|pick| pick.game_id == game_id)
                    .map(|pick| pick.name.to_string())
            })
            .unwrap_or_else(|| format!("Game {}", game_id))
    }

    pub fn describe(&self) -> ModelDescription {
        self.engine.describe()
    }

    pub fn model_info(&self) -> ModelInfoResponse {
        let description = self.engine.describe();
        ModelInfoResponse {
            status: if description.is_trained {
                "operational".to_string()
            } else {
                "not_trained".to_string()
            },
            is_trained: description.is_trained,
            n_neighbors: description.neighbor_count,
            games_count: description.item_count,
            interactions_count: description.interaction_count,
            dimensions: description.dimensions,
            category_vocabulary: description.category_vocabulary,
            mechanic_vocabulary: description.mechanic_vocabulary,
            algorithm: "KNN (K-Nearest Neighbors)".to_string(),
            metric: format!("{} similarity", description.metric),
            generation_id: description.generation_id.map(|id| id.to_string()),
            trained_at: description.trained_at.map(|t| t.to_rfc3339()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::services::sample_catalog::sample_games;

    fn user(purchases: Vec<Interaction>) -> UserData {
        UserData {
            user_id: 7,
            purchases,
            age: None,
            preferred_player_count: None,
        }
    }

    fn trained_service() -> RecommendationService {
        let engine = Arc::new(RecommendationEngine::new(5));
        engine.train(sample_games(), None).unwrap();
        RecommendationService::new(engine)
    }

    #[test]
    fn test_untrained_service_uses_static_list() {
        let service = RecommendationService::new(Arc::new(RecommendationEngine::new(5)));
        let picks = service.recommend(&user(vec![Interaction::rated(1, 4.0)]), 3, true);

        let ids: Vec<GameId> = picks.iter().map(|p| p.game_id).collect();
        assert_eq!(ids, vec![101, 102, 103]);
        assert_eq!(picks[0].game_name, "Pandemic");
        assert_eq!(picks[0].score, 0.85);
    }

    #[test]
    fn test_static_list_skips_owned() {
        let service = RecommendationService::new(Arc::new(RecommendationEngine::new(5)));
        let picks = service.recommend(&user(vec![Interaction::new(101)]), 5, true);

        assert_eq!(picks.len(), 4);
        assert!(picks.iter().all(|p| p.game_id != 101));
    }

    #[test]
    fn test_personalized_names_and_rounding() {
        let service = trained_service();
        let picks = service.recommend(
            &user(vec![Interaction::rated(110, 5.0), Interaction::rated(106, 4.5)]),
            4,
            true,
        );

        assert_eq!(picks.len(), 4);
        assert!(picks.iter().all(|p| p.game_id != 110 && p.game_id != 106));
        assert!(picks.iter().all(|p| !p.game_name.starts_with("Game ")));
        assert!(picks.iter().all(|p| p.score == round_score(p.score)));
        assert!(picks[0].reason.as_deref().unwrap().starts_with("Similar to game"));
    }

    #[test]
    fn test_game_name_resolution() {
        let service = trained_service();

        assert_eq!(service.game_name(109), "Codenames");
        assert_eq!(service.game_name(4242), "Game 4242");
    }

    #[test]
    fn test_similar_games_requires_training() {
        let service = RecommendationService::new(Arc::new(RecommendationEngine::new(5)));

        assert!(matches!(
            service.similar_games(101, 3),
            Err(ApiError::ModelNotTrained)
        ));
        assert!(trained_service().similar_games(999, 3).unwrap().is_empty());
    }

    #[test]
    fn test_model_info() {
        let info = trained_service().model_info();

        assert_eq!(info.status, "operational");
        assert_eq!(info.games_count, 10);
        assert_eq!(info.metric, "cosine similarity");
        assert!(info.generation_id.is_some());
    }

    #[actix_web::test]
    async fn test_train_rejects_empty_catalog() {
        let service = trained_service();

        assert!(matches!(
            service.train(Vec::new(), Vec::new()).await,
            Err(ApiError::InvalidInput(_))
        ));
        assert!(service.train_in_background(Vec::new(), Vec::new()).is_err());
        assert_eq!(service.describe().item_count, 10);
    }

    #[actix_web::test]
    async fn test_train_replaces_catalog() {
        let service = trained_service();
        let count = service
            .train(sample_games().into_iter().take(4).collect(), Vec::new())
            .await
            .unwrap();

        assert_eq!(count, 4);
        assert_eq!(service.describe().item_count, 4);
    }
}
