use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::game::{deserialize_optional_f64, GameId};

/// One user's purchase or play record against a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub game_id: GameId,
    /// Rating from 0 to 5.
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub playtime_hours: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<DateTime<Utc>>,
}

impl Interaction {
    pub fn new(game_id: GameId) -> Self {
        Self {
            user_id: None,
            game_id,
            rating: None,
            playtime_hours: None,
            purchase_date: None,
        }
    }

    pub fn rated(game_id: GameId, rating: f64) -> Self {
        Self {
            rating: Some(rating),
            ..Self::new(game_id)
        }
    }

    pub fn with_playtime(mut self, hours: f64) -> Self {
        self.playtime_hours = Some(hours);
        self
    }

    /// Checks the value ranges accepted on the wire.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(rating) = self.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(format!(
                    "rating for game {} must be between 0 and 5, got {}",
                    self.game_id, rating
                ));
            }
        }
        if let Some(hours) = self.playtime_hours {
            if hours.is_nan() || hours < 0.0 {
                return Err(format!(
                    "playtime_hours for game {} must be non-negative, got {}",
                    self.game_id, hours
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ranges() {
        assert!(Interaction::rated(1, 5.0).validate().is_ok());
        assert!(Interaction::rated(1, 0.0).validate().is_ok());
        assert!(Interaction::rated(1, 5.5).validate().is_err());
        assert!(Interaction::rated(1, -0.1).validate().is_err());
        assert!(Interaction::new(1).with_playtime(-2.0).validate().is_err());
        assert!(Interaction::new(1).with_playtime(12.0).validate().is_ok());
    }
}
