use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

pub use game::{Game, GameId};
pub use interaction::Interaction;

mod game;
mod interaction;

pub const MODEL_VERSION: &str = "KNN-v1.0";
pub const MAX_RECOMMENDATIONS: usize = 20;

/// A user and the games they already own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: i64,
    #[serde(default)]
    pub purchases: Vec<Interaction>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub preferred_player_count: Option<u32>,
}

impl UserData {
    pub fn validate(&self) -> Result<()> {
        self.purchases
            .iter()
            .try_for_each(|p| p.validate().map_err(ApiError::InvalidInput))
    }
}

/// Request structure for personalized recommendations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_data: UserData,
    #[serde(default = "default_num_recommendations")]
    pub num_recommendations: usize,
    #[serde(default = "default_exclude_owned")]
    pub exclude_owned: bool,
}

impl RecommendationRequest {
    pub fn validate(&self) -> Result<()> {
        validate_limit(self.num_recommendations)?;
        self.user_data.validate()
    }
}

pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 || limit > MAX_RECOMMENDATIONS {
        return Err(ApiError::InvalidInput(format!(
            "num_recommendations must be between 1 and {}, got {}",
            MAX_RECOMMENDATIONS, limit
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecommendation {
    pub game_id: GameId,
    pub game_name: String,
    pub score: f64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: i64,
    pub recommendations: Vec<GameRecommendation>,
    pub model_version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimpleRecommendationQuery {
    pub num_recommendations: Option<usize>,
}

/// Games and optional interaction history for a (re)training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingData {
    pub games: Vec<Game>,
    #[serde(default)]
    pub user_interactions: Option<Vec<Interaction>>,
}

impl TrainingData {
    pub fn validate(&self) -> Result<()> {
        validate_games(&self.games)?;
        self.user_interactions
            .iter()
            .flatten()
            .try_for_each(|i| i.validate().map_err(ApiError::InvalidInput))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDataUpload {
    pub games: Vec<Game>,
}

impl GameDataUpload {
    pub fn validate(&self) -> Result<()> {
        validate_games(&self.games)
    }
}

pub fn validate_games(games: &[Game]) -> Result<()> {
    games
        .iter()
        .try_for_each(|g| g.validate().map_err(ApiError::InvalidInput))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResponse {
    pub status: String,
    pub message: String,
    pub games_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interactions_count: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarGamesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarGameEntry {
    pub game_id: GameId,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarGamesResponse {
    pub game_id: GameId,
    pub similar_games: Vec<SimilarGameEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub status: String,
    pub is_trained: bool,
    pub n_neighbors: usize,
    pub games_count: usize,
    pub interactions_count: usize,
    pub dimensions: usize,
    pub category_vocabulary: usize,
    pub mechanic_vocabulary: usize,
    pub algorithm: String,
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,
    pub version: String,
}

fn default_num_recommendations() -> usize {
    5
}

fn default_exclude_owned() -> bool {
    true
}

/// Rounds a score to three decimals for responses.
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: RecommendationRequest =
            serde_json::from_str(r#"{"user_data": {"user_id": 4, "purchases": []}}"#).unwrap();

        assert_eq!(request.num_recommendations, 5);
        assert!(request.exclude_owned);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_validation() {
        let mut request: RecommendationRequest = serde_json::from_str(
            r#"{"user_data": {"user_id": 4, "purchases": [{"game_id": 1, "rating": 9}]}}"#,
        )
        .unwrap();
        assert!(matches!(request.validate(), Err(ApiError::InvalidInput(_))));

        request.user_data.purchases.clear();
        request.num_recommendations = 21;
        assert!(matches!(request.validate(), Err(ApiError::InvalidInput(_))));

        request.num_recommendations = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_training_data_validation() {
        let data: TrainingData = serde_json::from_str(
            r#"{"games": [{"game_id": 1, "min_players": 6, "max_players": 2}]}"#,
        )
        .unwrap();
        assert!(matches!(data.validate(), Err(ApiError::InvalidInput(_))));

        let data: TrainingData = serde_json::from_str(
            r#"{"games": [{"game_id": 1}], "user_interactions": [{"game_id": 1, "rating": -1}]}"#,
        )
        .unwrap();
        assert!(data.validate().is_err());

        let upload = GameDataUpload {
            games: vec![Game::new(1).with_rating(4.0), Game::new(2)],
        };
        assert!(upload.validate().is_ok());
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.123);
        assert_eq!(round_score(0.9996), 1.0);
    }
}
