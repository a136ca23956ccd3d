//! Item-based nearest-neighbor recommendation core.

use serde::Serialize;

use crate::models::GameId;

pub mod fallback;
pub mod feature_vectorizer;
pub mod generation;
pub mod neighbor_index;
pub mod popularity;
pub mod recommendation_engine;

pub use fallback::{FallbackChain, RecommendationStrategy, UserRequest};
pub use feature_vectorizer::FeatureVectorizer;
pub use generation::ModelGeneration;
pub use neighbor_index::NeighborIndex;
pub use recommendation_engine::{ModelDescription, RecommendationEngine};

/// A game close to a query game in feature space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarGame {
    pub game_id: GameId,
    /// Cosine similarity clamped to `[0, 1]`.
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub game_id: GameId,
    pub score: f64,
    pub reason: String,
}
