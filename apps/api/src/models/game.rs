use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

pub type GameId = i64;

fn deserialize_tokens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
        Null,
    }

    let raw = match StringOrVec::deserialize(deserializer)? {
        // Comma-separated list or a single token
        StringOrVec::String(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
        StringOrVec::Vec(v) => v,
        StringOrVec::Null => Vec::new(),
    };

    Ok(dedup_tokens(raw))
}

/// Drops blanks and repeated tokens, keeping first-appearance order.
fn dedup_tokens(raw: Vec<String>) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::with_capacity(raw.len());
    for token in raw {
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

pub(crate) fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
        Null,
    }

    match StringOrFloat::deserialize(deserializer)? {
        StringOrFloat::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                let value = f64::from_str(s).map_err(serde::de::Error::custom)?;
                finite(value).map(Some)
            }
        }
        StringOrFloat::Float(f) => finite(f).map(Some),
        StringOrFloat::Null => Ok(None),
    }
}

fn finite<E: serde::de::Error>(value: f64) -> Result<f64, E> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(E::custom(format!("expected a finite number, got {}", value)))
    }
}

fn default_min_players() -> u32 {
    1
}

fn default_max_players() -> u32 {
    10
}

fn default_playtime() -> u32 {
    60
}

fn default_complexity() -> f64 {
    2.5
}

/// A board game as it enters a training batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(alias = "id")]
    pub game_id: GameId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_tokens")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_tokens")]
    pub mechanics: Vec<String>,
    #[serde(default = "default_min_players")]
    pub min_players: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    #[serde(default = "default_playtime")]
    pub avg_playtime_minutes: u32,
    #[serde(default = "default_complexity")]
    pub complexity: f64,
    #[serde(default)]
    pub year_published: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub average_rating: Option<f64>,
}

impl Game {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            name: None,
            categories: Vec::new(),
            mechanics: Vec::new(),
            min_players: default_min_players(),
            max_players: default_max_players(),
            avg_playtime_minutes: default_playtime(),
            complexity: default_complexity(),
            year_published: None,
            average_rating: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = dedup_tokens(categories.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_mechanics(mut self, mechanics: &[&str]) -> Self {
        self.mechanics = dedup_tokens(mechanics.iter().map(|m| m.to_string()).collect());
        self
    }

    pub fn with_players(mut self, min_players: u32, max_players: u32) -> Self {
        self.min_players = min_players;
        self.max_players = max_players;
        self
    }

    pub fn with_playtime(mut self, minutes: u32) -> Self {
        self.avg_playtime_minutes = minutes;
        self
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year_published = Some(year);
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.average_rating = Some(rating);
        self
    }

    /// Checks the numeric attributes before they reach a feature matrix.
    pub fn validate(&self) -> Result<(), String> {
        if !self.complexity.is_finite() {
            return Err(format!("game {}: complexity must be finite", self.game_id));
        }
        if let Some(rating) = self.average_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(format!(
                    "game {}: average_rating must be between 0 and 5, got {}",
                    self.game_id, rating
                ));
            }
        }
        if self.min_players > self.max_players {
            return Err(format!(
                "game {}: min_players {} exceeds max_players {}",
                self.game_id, self.min_players, self.max_players
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_fields() {
        let game: Game = serde_json::from_str(r#"{"game_id": 7}"#).unwrap();

        assert_eq!(game.min_players, 1);
        assert_eq!(game.max_players, 10);
        assert_eq!(game.avg_playtime_minutes, 60);
        assert_eq!(game.complexity, 2.5);
        assert!(game.average_rating.is_none());
        assert!(game.categories.is_empty());
    }

    #[test]
    fn test_lenient_token_and_rating_fields() {
        let game: Game = serde_json::from_str(
            r#"{
                "id": 3,
                "categories": "Strategy, Economic, Strategy",
                "mechanics": ["Trading", "Trading", "Dice Rolling"],
                "average_rating": "4.25"
            }"#,
        )
        .unwrap();

        assert_eq!(game.game_id, 3);
        assert_eq!(game.categories, vec!["Strategy", "Economic"]);
        assert_eq!(game.mechanics, vec!["Trading", "Dice Rolling"]);
        assert_eq!(game.average_rating, Some(4.25));
    }

    #[test]
    fn test_null_fields() {
        let game: Game =
            serde_json::from_str(r#"{"game_id": 1, "categories": null, "average_rating": null}"#)
                .unwrap();

        assert!(game.categories.is_empty());
        assert!(game.average_rating.is_none());
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for raw in ["NaN", "inf", "-Infinity"] {
            let json = format!(r#"{{"game_id": 1, "average_rating": "{}"}}"#, raw);
            assert!(serde_json::from_str::<Game>(&json).is_err(), "{} accepted", raw);
        }
    }

    #[test]
    fn test_validate() {
        assert!(Game::new(1).with_rating(4.5).validate().is_ok());
        assert!(Game::new(1).with_rating(0.0).validate().is_ok());

        assert!(Game::new(1).with_rating(5.5).validate().is_err());
        assert!(Game::new(1).with_rating(f64::NAN).validate().is_err());
        assert!(Game::new(1).with_complexity(f64::INFINITY).validate().is_err());
        assert!(Game::new(1).with_players(5, 2).validate().is_err());
    }
}
