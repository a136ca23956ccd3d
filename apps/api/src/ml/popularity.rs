use std::collections::HashSet;

use super::feature_vectorizer::DEFAULT_AVERAGE_RATING;
use super::{ModelGeneration, Recommendation};
use crate::models::GameId;

pub const POPULAR_REASON: &str = "Popular game (new user)";

/// The `n` best-rated games of a generation, skipping `excluded` ids.
/// Equal ratings keep catalog order.
pub fn popular(
    generation: &ModelGeneration,
    n: usize,
    excluded: &HashSet<GameId>,
) -> Vec<Recommendation> {
    let mut ranked: Vec<(GameId, f64)> = generation
        .games()
        .iter()
        .filter(|game| !excluded.contains(&game.game_id))
        .map(|game| {
            (
                game.game_id,
                game.average_rating.unwrap_or(DEFAULT_AVERAGE_RATING),
            )
        })
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(n)
        .map(|(game_id, rating)| Recommendation {
            game_id,
            score: rating / 5.0,
            reason: POPULAR_REASON.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Game;

    fn generation() -> ModelGeneration {
        ModelGeneration::train(
            vec![
                Game::new(1).with_rating(3.5),
                Game::new(2).with_rating(4.5),
                Game::new(3),
                Game::new(4).with_rating(4.5),
            ],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_by_rating_with_stable_ties() {
        let picks = popular(&generation(), 3, &HashSet::new());

        let ids: Vec<GameId> = picks.iter().map(|p| p.game_id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
        assert!((picks[0].score - 0.9).abs() < 1e-12);
        assert!(picks.iter().all(|p| p.reason == POPULAR_REASON));
    }

    #[test]
    fn test_missing_rating_uses_default() {
        let picks = popular(&generation(), 10, &HashSet::new());

        let unrated = picks.iter().find(|p| p.game_id == 3).unwrap();
        assert!((unrated.score - DEFAULT_AVERAGE_RATING / 5.0).abs() < 1e-12);
        assert_eq!(picks.len(), 4);
    }

    #[test]
    fn test_exclusions_and_zero_limit() {
        let excluded: HashSet<GameId> = [2].into_iter().collect();
        let picks = popular(&generation(), 1, &excluded);

        assert_eq!(picks[0].game_id, 4);
        assert!(popular(&generation(), 0, &HashSet::new()).is_empty());
    }
}
