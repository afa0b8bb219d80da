use std::sync::Arc;

use crate::services::{ArtifactSource, Recommender};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Serves lookups against the current artifacts
    pub recommender: Recommender,
    /// Where `/reload` fetches fresh artifacts from
    pub source: Arc<dyn ArtifactSource>,
}

impl AppState {
    pub fn new(recommender: Recommender, source: Arc<dyn ArtifactSource>) -> Self {
        Self {
            recommender,
            source,
        }
    }

    /// Loads artifacts from `source` and returns state ready to serve.
    ///
    /// Fails if the load fails, so callers never start with partial state.
    pub async fn load(source: Arc<dyn ArtifactSource>) -> crate::error::AppResult<Self> {
        let recommender = Recommender::new();
        recommender.load(source.as_ref()).await?;
        Ok(Self::new(recommender, source))
    }
}
