use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

use super::{FeatureVectorizer, NeighborIndex, SimilarGame};
use crate::error::RecommenderError;
use crate::models::{Game, GameId, Interaction};

/// One complete, immutable trained state: vocabulary, normalization,
/// feature index and identifier maps built from a single training batch.
#[derive(Debug)]
pub struct ModelGeneration {
    id: Uuid,
    trained_at: DateTime<Utc>,
    vectorizer: FeatureVectorizer,
    index: NeighborIndex,
    games: Vec<Game>,
    rows: HashMap<GameId, usize>,
    interaction_count: usize,
}

impl ModelGeneration {
    /// Builds a generation from scratch. Repeated identifiers keep their
    /// first record and records with unusable numbers are skipped.
    pub fn train(
        games: Vec<Game>,
        interactions: &[Interaction],
    ) -> Result<Self, RecommenderError> {
        let mut seen = HashSet::with_capacity(games.len());
        let games: Vec<Game> = games
            .into_iter()
            .filter(|game| {
                if let Err(reason) = game.validate() {
                    warn!(game_id = game.game_id, %reason, "Skipping invalid game");
                    return false;
                }
                let fresh = seen.insert(game.game_id);
                if !fresh {
                    warn!(
                        game_id = game.game_id,
                        "Skipping duplicate game in training batch"
                    );
                }
                fresh
            })
            .collect();

        if games.is_empty() {
            return Err(RecommenderError::EmptyTrainingSet);
        }

        let (vectorizer, matrix) = FeatureVectorizer::fit(&games)?;
        let index = NeighborIndex::build(matrix);
        let rows = games
            .iter()
            .enumerate()
            .map(|(row, game)| (game.game_id, row))
            .collect();

        let generation = Self {
            id: Uuid::new_v4(),
            trained_at: Utc::now(),
            vectorizer,
            index,
            games,
            rows,
            interaction_count: interactions.len(),
        };

        info!(
            generation = %generation.id,
            games = generation.len(),
            interactions = generation.interaction_count,
            dimensions = generation.dimension(),
            "Built model generation"
        );

        Ok(generation)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn vectorizer(&self) -> &FeatureVectorizer {
        &self.vectorizer
    }

    pub fn interaction_count(&self) -> usize {
        self.interaction_count
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn game(&self, game_id: GameId) -> Option<&Game> {
        self.rows.get(&game_id).map(|&row| &self.games[row])
    }

    pub fn contains(&self, game_id: GameId) -> bool {
        self.rows.contains_key(&game_id)
    }

    fn row_of(&self, game_id: GameId) -> Result<usize, RecommenderError> {
        self.rows
            .get(&game_id)
            .copied()
            .ok_or(RecommenderError::UnknownItem(game_id))
    }

    /// Up to `n` catalog games nearest to `game_id`, most similar first,
    /// never including `game_id` itself.
    pub fn similar_items(
        &self,
        game_id: GameId,
        n: usize,
    ) -> Result<Vec<SimilarGame>, RecommenderError> {
        let row = self.row_of(game_id)?;
        let vector = self
            .index
            .row(row)
            .ok_or(RecommenderError::UnknownItem(game_id))?;
        let neighbors = self.index.query(vector, n.saturating_add(1))?;

        Ok(neighbors
            .into_iter()
            .filter(|neighbor| neighbor.row != row)
            .take(n)
            .map(|neighbor| SimilarGame {
                game_id: self.games[neighbor.row].game_id,
                similarity: neighbor.similarity(),
            })
            .collect())
    }

    /// Nearest catalog games for an arbitrary record, vectorized with this
    /// generation's vocabulary. A catalog game with the same identifier is skipped.
    pub fn similar_to_game(
        &self,
        game: &Game,
        n: usize,
    ) -> Result<Vec<SimilarGame>, RecommenderError> {
        let vector = self.vectorizer.transform(game)?;
        let neighbors = self.index.query(vector.view(), n.saturating_add(1))?;

        Ok(neighbors
            .into_iter()
            .map(|neighbor| SimilarGame {
                game_id: self.games[neighbor.row].game_id,
                similarity: neighbor.similarity(),
            })
            .filter(|entry| entry.game_id != game.game_id)
            .take(n)
            .collect())
    }
}
