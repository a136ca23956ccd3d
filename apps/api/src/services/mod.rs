pub mod recommendation;
pub mod sample_catalog;

// Re-export public types
pub use recommendation::RecommendationService;
pub use sample_catalog::sample_games;
