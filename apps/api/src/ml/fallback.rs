//! Ordered recommendation strategies: each is tried in turn and the first
//! non-empty successful result wins.

use tracing::{debug, warn};

use super::Recommendation;
use crate::error::RecommenderError;
use crate::models::Interaction;

#[derive(Debug, Clone, Copy)]
pub struct UserRequest<'a> {
    pub purchases: &'a [Interaction],
    pub limit: usize,
    pub exclude_owned: bool,
}

pub trait RecommendationStrategy {
    fn name(&self) -> &'static str;

    fn recommend(
        &self,
        request: &UserRequest<'_>,
    ) -> Result<Vec<Recommendation>, RecommenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome {
    /// Name of the strategy that produced the result.
    pub strategy: &'static str,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Default)]
pub struct FallbackChain<'a> {
    strategies: Vec<Box<dyn RecommendationStrategy + 'a>>,
}

impl<'a> FallbackChain<'a> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: impl RecommendationStrategy + 'a) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Runs the strategies in order. When none produces recommendations the
    /// outcome is empty if any strategy succeeded, otherwise the first error.
    pub fn run(&self, request: &UserRequest<'_>) -> Result<ChainOutcome, RecommenderError> {
        let mut first_error = None;
        let mut empty_from = None;

        for strategy in &self.strategies {
            match strategy.recommend(request) {
                Ok(recommendations) if !recommendations.is_empty() => {
                    debug!(
                        strategy = strategy.name(),
                        count = recommendations.len(),
                        "Recommendation strategy succeeded"
                    );
                    return Ok(ChainOutcome {
                        strategy: strategy.name(),
                        recommendations,
                    });
                }
                Ok(_) => {
                    debug!(strategy = strategy.name(), "Recommendation strategy returned nothing");
                    empty_from.get_or_insert(strategy.name());
                }
                Err(e) => {
                    warn!(
                        strategy = strategy.name(),
                        error = %e,
                        "Recommendation strategy failed, falling back"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match (empty_from, first_error) {
            (Some(strategy), _) => Ok(ChainOutcome {
                strategy,
                recommendations: Vec::new(),
            }),
            (None, Some(e)) => Err(e),
            (None, None) => Ok(ChainOutcome {
                strategy: "none",
                recommendations: Vec::new(),
            }),
        }
    }
}
