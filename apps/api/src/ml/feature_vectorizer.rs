//! Turns game records into standardized numeric feature vectors.
//!
//! Column layout, fixed for one training generation:
//!
//! 1. the numeric attributes in [`NUMERIC_FEATURES`] order
//! 2. one indicator column per category token, in first-appearance order
//! 3. one indicator column per mechanic token, in first-appearance order
//!
//! Every column is then z-score standardized with statistics taken from the
//! training matrix only.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use std::collections::HashMap;
use tracing::debug;

use crate::error::RecommenderError;
use crate::models::Game;

pub const NUMERIC_FEATURES: [&str; 5] = [
    "min_players",
    "max_players",
    "avg_playtime_minutes",
    "complexity",
    "average_rating",
];

/// Rating used for games that carry no average rating.
pub const DEFAULT_AVERAGE_RATING: f64 = 3.0;

/// Ordered set of tokens observed in one training batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenVocabulary {
    tokens: Vec<String>,
    positions: HashMap<String, usize>,
}

impl TokenVocabulary {
    fn observe(&mut self, token: &str) {
        if !self.positions.contains_key(token) {
            self.positions.insert(token.to_string(), self.tokens.len());
            self.tokens.push(token.to_string());
        }
    }

    pub fn position(&self, token: &str) -> Option<usize> {
        self.positions.get(token).copied()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    pub categories: TokenVocabulary,
    pub mechanics: TokenVocabulary,
}

impl Vocabulary {
    pub fn from_games(games: &[Game]) -> Self {
        let mut vocabulary = Self::default();
        for game in games {
            game.categories
                .iter()
                .for_each(|c| vocabulary.categories.observe(c));
            game.mechanics
                .iter()
                .for_each(|m| vocabulary.mechanics.observe(m));
        }
        vocabulary
    }

    pub fn dimension(&self) -> usize {
        NUMERIC_FEATURES.len() + self.categories.len() + self.mechanics.len()
    }

    /// Raw (unnormalized) vector for `game`. Tokens outside the vocabulary are dropped.
    pub fn encode(&self, game: &Game) -> Array1<f64> {
        let mut vector = Array1::zeros(self.dimension());
        vector[0] = f64::from(game.min_players);
        vector[1] = f64::from(game.max_players);
        vector[2] = f64::from(game.avg_playtime_minutes);
        vector[3] = game.complexity;
        vector[4] = game.average_rating.unwrap_or(DEFAULT_AVERAGE_RATING);

        let category_offset = NUMERIC_FEATURES.len();
        for position in game
            .categories
            .iter()
            .filter_map(|c| self.categories.position(c))
        {
            vector[category_offset + position] = 1.0;
        }

        let mechanic_offset = category_offset + self.categories.len();
        for position in game
            .mechanics
            .iter()
            .filter_map(|m| self.mechanics.position(m))
        {
            vector[mechanic_offset + position] = 1.0;
        }

        vector
    }
}

/// Per-column z-score parameters learned from a training matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl Normalization {
    /// Population statistics per column. Constant columns get their own value
    /// as mean and a unit scale, so they standardize to exactly zero.
    pub fn fit(matrix: &Array2<f64>) -> Self {
        let columns = matrix.ncols();
        let mut mean = Array1::zeros(columns);
        let mut scale = Array1::ones(columns);

        for (j, column) in matrix.axis_iter(Axis(1)).enumerate() {
            let Some(&first) = column.iter().next() else {
                continue;
            };
            if column.iter().all(|&v| v == first) {
                mean[j] = first;
                continue;
            }
            let column_mean = column.sum() / column.len() as f64;
            let variance = column
                .iter()
                .map(|v| (v - column_mean).powi(2))
                .sum::<f64>()
                / column.len() as f64;
            mean[j] = column_mean;
            if variance > 0.0 {
                scale[j] = variance.sqrt();
            }
        }

        Self { mean, scale }
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    pub fn apply(&self, raw: ArrayView1<'_, f64>) -> Result<Array1<f64>, RecommenderError> {
        if raw.len() != self.dimension() {
            return Err(RecommenderError::DimensionMismatch {
                expected: self.dimension(),
                got: raw.len(),
            });
        }
        Ok((&raw - &self.mean) / &self.scale)
    }

    pub fn apply_matrix(&self, matrix: &Array2<f64>) -> Array2<f64> {
        (matrix - &self.mean) / &self.scale
    }
}

/// A fitted vectorizer: the vocabulary and normalization of one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVectorizer {
    vocabulary: Vocabulary,
    normalization: Normalization,
}

impl FeatureVectorizer {
    /// Learns vocabulary and normalization from `games` and returns the
    /// standardized matrix, one row per game in input order.
    pub fn fit(games: &[Game]) -> Result<(Self, Array2<f64>), RecommenderError> {
        if games.is_empty() {
            return Err(RecommenderError::EmptyTrainingSet);
        }

        let vocabulary = Vocabulary::from_games(games);
        let mut raw = Array2::zeros((games.len(), vocabulary.dimension()));
        for (mut row, game) in raw.axis_iter_mut(Axis(0)).zip(games) {
            row.assign(&vocabulary.encode(game));
        }

        let normalization = Normalization::fit(&raw);
        let matrix = normalization.apply_matrix(&raw);

        debug!(
            games = games.len(),
            categories = vocabulary.categories.len(),
            mechanics = vocabulary.mechanics.len(),
            dimensions = vocabulary.dimension(),
            "Fitted feature vectorizer"
        );

        Ok((
            Self {
                vocabulary,
                normalization,
            },
            matrix,
        ))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn dimension(&self) -> usize {
        self.vocabulary.dimension()
    }

    /// Standardized vector for any game, seen at training time or not.
    pub fn transform(&self, game: &Game) -> Result<Array1<f64>, RecommenderError> {
        self.transform_vector(self.vocabulary.encode(game).view())
    }

    /// Standardizes a raw vector that already follows this generation's layout.
    pub fn transform_vector(
        &self,
        raw: ArrayView1<'_, f64>,
    ) -> Result<Array1<f64>, RecommenderError> {
        self.normalization.apply(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Game> {
        vec![
            Game::new(1)
                .with_categories(&["Strategy", "Economic"])
                .with_mechanics(&["Trading"])
                .with_complexity(3.0)
                .with_rating(4.0),
            Game::new(2)
                .with_categories(&["Party"])
                .with_mechanics(&["Team Play", "Trading"])
                .with_complexity(1.0),
            Game::new(3)
                .with_categories(&["Strategy"])
                .with_complexity(2.0)
                .with_rating(5.0),
        ]
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        assert_eq!(
            FeatureVectorizer::fit(&[]).unwrap_err(),
            RecommenderError::EmptyTrainingSet
        );
    }

    #[test]
    fn test_vocabulary_keeps_first_appearance_order() {
        let (vectorizer, matrix) = FeatureVectorizer::fit(&catalog()).unwrap();
        let vocabulary = vectorizer.vocabulary();

        assert_eq!(
            vocabulary.categories.tokens(),
            &["Strategy", "Economic", "Party"]
        );
        assert_eq!(vocabulary.mechanics.tokens(), &["Trading", "Team Play"]);
        assert_eq!(vectorizer.dimension(), NUMERIC_FEATURES.len() + 3 + 2);
        assert_eq!(matrix.dim(), (3, vectorizer.dimension()));
    }

    #[test]
    fn test_raw_encoding_layout() {
        let games = catalog();
        let vocabulary = Vocabulary::from_games(&games);
        let raw = vocabulary.encode(&games[1]);

        assert_eq!(raw[0], 1.0);
        assert_eq!(raw[1], 10.0);
        assert_eq!(raw[2], 60.0);
        assert_eq!(raw[3], 1.0);
        // Missing rating takes the default
        assert_eq!(raw[4], DEFAULT_AVERAGE_RATING);
        // Categories: Strategy, Economic, Party
        assert_eq!(raw.slice(ndarray::s![5..8]).to_vec(), vec![0.0, 0.0, 1.0]);
        // Mechanics: Trading, Team Play
        assert_eq!(raw.slice(ndarray::s![8..10]).to_vec(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_columns_are_standardized() {
        let (_, matrix) = FeatureVectorizer::fit(&catalog()).unwrap();

        // complexity column: 3, 1, 2 -> mean 2, population std sqrt(2/3)
        let complexity = matrix.column(3);
        let expected = 1.0 / (2.0f64 / 3.0).sqrt();
        assert!((complexity[0] - expected).abs() < 1e-12);
        assert!((complexity[1] + expected).abs() < 1e-12);
        assert!(complexity[2].abs() < 1e-12);

        for column in matrix.axis_iter(Axis(1)) {
            assert!(column.sum().abs() < 1e-9);
        }
    }

    #[test]
    fn test_constant_columns_become_zero() {
        let (vectorizer, matrix) = FeatureVectorizer::fit(&catalog()).unwrap();

        // min_players, max_players and playtime are identical across the batch
        for j in 0..3 {
            assert!(matrix.column(j).iter().all(|&v| v == 0.0));
            assert_eq!(vectorizer.normalization.scale[j], 1.0);
        }
        assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_single_game_batch_is_finite() {
        let (_, matrix) =
            FeatureVectorizer::fit(&[Game::new(9).with_categories(&["Solo"])]).unwrap();

        assert!(matrix.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_matches_training_rows() {
        let games = catalog();
        let (vectorizer, matrix) = FeatureVectorizer::fit(&games).unwrap();

        for (i, game) in games.iter().enumerate() {
            let row = vectorizer.transform(game).unwrap();
            for (a, b) in row.iter().zip(matrix.row(i)) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_transform_drops_unknown_tokens() {
        let games = catalog();
        let (vectorizer, _) = FeatureVectorizer::fit(&games).unwrap();

        let mut stranger = games[2].clone();
        stranger.categories.push("Horror".to_string());
        stranger.mechanics.push("Legacy".to_string());

        let vector = vectorizer.transform(&stranger).unwrap();
        assert_eq!(vector.len(), vectorizer.dimension());
        assert_eq!(vector, vectorizer.transform(&games[2]).unwrap());
    }

    #[test]
    fn test_transform_vector_checks_dimension() {
        let (vectorizer, _) = FeatureVectorizer::fit(&catalog()).unwrap();
        let short = Array1::zeros(3);

        assert_eq!(
            vectorizer.transform_vector(short.view()).unwrap_err(),
            RecommenderError::DimensionMismatch {
                expected: vectorizer.dimension(),
                got: 3
            }
        );
    }
}
