use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::models::GameId;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures raised by the recommendation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommenderError {
    #[error("Model is not trained")]
    NotTrained,

    #[error("Unknown game: {0}")]
    UnknownItem(GameId),

    #[error("Cannot train on an empty game list")]
    EmptyTrainingSet,

    #[error("Feature vector has {got} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Recommendation aggregation failed: {0}")]
    AggregationFailure(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model is not trained yet")]
    ModelNotTrained,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let error = ErrorResponse {
            error: self.to_string(),
        };

        match self {
            ApiError::InvalidInput(_) => HttpResponse::BadRequest().json(error),
            ApiError::NotFound(_) => HttpResponse::NotFound().json(error),
            ApiError::ModelNotTrained => HttpResponse::ServiceUnavailable().json(error),
            _ => HttpResponse::InternalServerError().json(error),
        }
    }
}

impl From<RecommenderError> for ApiError {
    fn from(err: RecommenderError) -> Self {
        match err {
            RecommenderError::NotTrained => ApiError::ModelNotTrained,
            RecommenderError::EmptyTrainingSet => ApiError::InvalidInput(err.to_string()),
            RecommenderError::UnknownItem(id) => ApiError::NotFound(format!("game {}", id)),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
