use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::fallback::{FallbackChain, RecommendationStrategy, UserRequest};
use super::neighbor_index::METRIC;
use super::popularity::popular;
use super::{ModelGeneration, Recommendation, SimilarGame};
use crate::error::RecommenderError;
use crate::models::{Game, GameId, Interaction};

/// Weight of a purchase with no usable rating.
pub const DEFAULT_PURCHASE_WEIGHT: f64 = 0.6;

/// Status snapshot for health and info endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescription {
    pub is_trained: bool,
    pub neighbor_count: usize,
    pub item_count: usize,
    pub interaction_count: usize,
    pub dimensions: usize,
    pub category_vocabulary: usize,
    pub mechanic_vocabulary: usize,
    pub metric: &'static str,
    pub generation_id: Option<Uuid>,
    pub trained_at: Option<DateTime<Utc>>,
}

/// Item-based recommender serving whichever generation was published last.
///
/// Training builds a complete [`ModelGeneration`] without holding any lock and
/// then swaps it in; queries clone the current `Arc` and never observe a
/// half-built generation.
pub struct RecommendationEngine {
    n_neighbors: usize,
    current: RwLock<Option<Arc<ModelGeneration>>>,
}

impl RecommendationEngine {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            current: RwLock::new(None),
        }
    }

    /// Replaces the whole model. On failure the previous generation stays published.
    pub fn train(
        &self,
        games: Vec<Game>,
        interactions: Option<&[Interaction]>,
    ) -> Result<Arc<ModelGeneration>, RecommenderError> {
        info!("Training recommendation model with {} games", games.len());
        let generation = ModelGeneration::train(games, interactions.unwrap_or_default())?;
        let generation = Arc::new(generation);

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(generation.clone());
        info!(generation = %generation.id(), "Published model generation");

        Ok(generation)
    }

    pub fn is_trained(&self) -> bool {
        self.snapshot().is_some()
    }

    fn snapshot(&self) -> Option<Arc<ModelGeneration>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The currently published generation.
    pub fn current(&self) -> Result<Arc<ModelGeneration>, RecommenderError> {
        self.snapshot().ok_or(RecommenderError::NotTrained)
    }

    /// Up to `n` games most similar to `game_id`. Unknown games yield an empty list.
    pub fn similar_items(
        &self,
        game_id: GameId,
        n: usize,
    ) -> Result<Vec<SimilarGame>, RecommenderError> {
        let generation = self.current()?;
        similar_or_empty(&generation, game_id, n)
    }

    /// Up to `n` catalog games most similar to a record that may not be in the catalog.
    pub fn similar_to_game(
        &self,
        game: &Game,
        n: usize,
    ) -> Result<Vec<SimilarGame>, RecommenderError> {
        self.current()?.similar_to_game(game, n)
    }

    pub fn popular(&self, n: usize) -> Result<Vec<Recommendation>, RecommenderError> {
        let generation = self.current()?;
        Ok(popular(&generation, n, &HashSet::new()))
    }

    /// Personalized recommendations from a purchase history. An empty history,
    /// an empty personalized result or an aggregation failure all degrade to
    /// the popularity ranking.
    pub fn recommend_for_user(
        &self,
        purchases: &[Interaction],
        n: usize,
        exclude_owned: bool,
    ) -> Result<Vec<Recommendation>, RecommenderError> {
        let generation = self.current()?;

        if purchases.is_empty() {
            warn!("No purchases supplied, using popular games");
            return Ok(popular(&generation, n, &HashSet::new()));
        }

        let request = UserRequest {
            purchases,
            limit: n,
            exclude_owned,
        };
        let outcome = FallbackChain::new()
            .then(PersonalizedStrategy {
                generation: &generation,
            })
            .then(PopularityStrategy {
                generation: &generation,
            })
            .run(&request)?;

        debug!(
            strategy = outcome.strategy,
            count = outcome.recommendations.len(),
            "Generated recommendations"
        );
        Ok(outcome.recommendations)
    }

    pub fn game(&self, game_id: GameId) -> Option<Game> {
        self.snapshot()?.game(game_id).cloned()
    }

    pub fn describe(&self) -> ModelDescription {
        match self.snapshot() {
            Some(generation) => {
                let vocabulary = generation.vectorizer().vocabulary();
                ModelDescription {
                    is_trained: true,
                    neighbor_count: self.n_neighbors,
                    item_count: generation.len(),
                    interaction_count: generation.interaction_count(),
                    dimensions: generation.dimension(),
                    category_vocabulary: vocabulary.categories.len(),
                    mechanic_vocabulary: vocabulary.mechanics.len(),
                    metric: METRIC,
                    generation_id: Some(generation.id()),
                    trained_at: Some(generation.trained_at()),
                }
            }
            None => ModelDescription {
                is_trained: false,
                neighbor_count: self.n_neighbors,
                item_count: 0,
                interaction_count: 0,
                dimensions: 0,
                category_vocabulary: 0,
                mechanic_vocabulary: 0,
                metric: METRIC,
                generation_id: None,
                trained_at: None,
            },
        }
    }
}

fn similar_or_empty(
    generation: &ModelGeneration,
    game_id: GameId,
    n: usize,
) -> Result<Vec<SimilarGame>, RecommenderError> {
    match generation.similar_items(game_id, n) {
        Err(RecommenderError::UnknownItem(id)) => {
            warn!(game_id = id, "Game not found in the current model");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Weight of one purchase: `rating / 5`, or the default when the rating is
/// missing or exactly zero.
pub fn purchase_weight(rating: Option<f64>) -> f64 {
    match rating {
        Some(rating) if rating != 0.0 => rating / 5.0,
        _ => DEFAULT_PURCHASE_WEIGHT,
    }
}

struct Candidate {
    game_id: GameId,
    score: f64,
    source: GameId,
}

/// Sums weighted similarities over every purchase. Candidates keep the first
/// purchase that surfaced them as their reason, and equal scores keep
/// discovery order.
fn aggregate(
    generation: &ModelGeneration,
    request: &UserRequest<'_>,
) -> Result<Vec<Recommendation>, RecommenderError> {
    let owned: HashSet<GameId> = request.purchases.iter().map(|p| p.game_id).collect();
    let fetch = request.limit.saturating_mul(2);

    let mut candidates: Vec<Candidate> = Vec::new();
    let mut positions: HashMap<GameId, usize> = HashMap::new();

    for purchase in request.purchases {
        let weight = purchase_weight(purchase.rating);
        let similar = similar_or_empty(generation, purchase.game_id, fetch)
            .map_err(|e| RecommenderError::AggregationFailure(e.to_string()))?;

        for entry in similar {
            if request.exclude_owned && owned.contains(&entry.game_id) {
                continue;
            }
            let score = entry.similarity * weight;
            match positions.get(&entry.game_id) {
                Some(&position) => candidates[position].score += score,
                None => {
                    positions.insert(entry.game_id, candidates.len());
                    candidates.push(Candidate {
                        game_id: entry.game_id,
                        score,
                        source: purchase.game_id,
                    });
                }
            }
        }
    }

    if let Some(bad) = candidates.iter().find(|c| !c.score.is_finite()) {
        return Err(RecommenderError::AggregationFailure(format!(
            "non-finite score for game {}",
            bad.game_id
        )));
    }

    // Stable: ties stay in discovery order
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(candidates
        .into_iter()
        .take(request.limit)
        .map(|candidate| Recommendation {
            game_id: candidate.game_id,
            score: candidate.score,
            reason: format!("Similar to game {}", candidate.source),
        })
        .collect())
}

struct PersonalizedStrategy<'g> {
    generation: &'g ModelGeneration,
}

impl RecommendationStrategy for PersonalizedStrategy<'_> {
    fn name(&self) -> &'static str {
        "personalized"
    }

    fn recommend(
        &self,
        request: &UserRequest<'_>,
    ) -> Result<Vec<Recommendation>, RecommenderError> {
        aggregate(self.generation, request)
    }
}

struct PopularityStrategy<'g> {
    generation: &'g ModelGeneration,
}

impl RecommendationStrategy for PopularityStrategy<'_> {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn recommend(
        &self,
        request: &UserRequest<'_>,
    ) -> Result<Vec<Recommendation>, RecommenderError> {
        let excluded: HashSet<GameId> = if request.exclude_owned {
            request.purchases.iter().map(|p| p.game_id).collect()
        } else {
            HashSet::new()
        };
        Ok(popular(self.generation, request.limit, &excluded))
    }
}
