use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Fatal errors raised while loading the catalog or similarity matrix.
///
/// Any of these must stop the service from serving: startup aborts and a
/// runtime reload keeps the previously loaded artifacts.
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {context}: {source}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("Artifact parsing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Malformed similarity matrix: {0}")]
    MalformedMatrix(String),

    #[error("Similarity matrix is not square: {rows} rows, {cols} columns")]
    NotSquare { rows: usize, cols: usize },

    #[error("Similarity matrix has a non-finite score at ({row}, {col})")]
    NonFiniteScore { row: usize, col: usize },

    #[error("Catalog contains no records")]
    EmptyCatalog,

    #[error("Similarity matrix is {matrix}x{matrix} but catalog has {catalog} records")]
    DimensionMismatch { matrix: usize, catalog: usize },
}

/// Errors from a single recommendation lookup
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Recommender artifacts are not loaded yet")]
    NotReady,

    #[error("No movie titled {0:?}")]
    NotFound(String),

    #[error("Lookup failed: {0}")]
    Internal(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ArtifactError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Handlers render misses as the placeholder payload, so only
        // `NotReady` and failed reloads reach this point in practice.
        let status = match self {
            AppError::Lookup(LookupError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Lookup(_) | AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
