use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod similarity;

pub use catalog::{Catalog, Movie, TitleIndex};
pub use similarity::SimilarityMatrix;

/// Payload returned in place of recommendations when a lookup fails.
pub const NOT_FOUND_PLACEHOLDER: [&str; 3] = [
    "Movie Not Found",
    "Try double checking movie name",
    "Try another movie",
];

/// Lookup request, accepted as a form body or a query string.
///
/// `title` is required; an empty title is an ordinary lookup miss.
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

/// Response body for the recommend endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendationResponse {
    pub rec: Vec<String>,
}

impl RecommendationResponse {
    pub fn not_found() -> Self {
        Self {
            rec: NOT_FOUND_PLACEHOLDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Serving state of the recommender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Healthy,
    Loading,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub catalog_size: Option<usize>,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReloadResponse {
    pub status: String,
    pub catalog_size: usize,
}
