use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use tracing::instrument;

use crate::{
    error::{ArtifactError, LookupError},
    models::RecommendationResponse,
    services::{artifacts::ArtifactSource, ranking::Artifacts},
};

/// Shared handle to the currently loaded artifacts.
///
/// Queries clone the inner `Arc` and rank against that snapshot without
/// holding the lock, so a concurrent reload never mixes a matrix from one
/// load with a catalog from another.
#[derive(Clone)]
pub struct Recommender {
    current: Arc<RwLock<Option<Arc<Artifacts>>>>,
}

impl Default for Recommender {
    fn default() -> Self {
        Self::new()
    }
}

impl Recommender {
    /// Creates a recommender with nothing loaded; lookups fail with `NotReady`.
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a recommender already serving `artifacts`.
    pub fn with_artifacts(artifacts: Artifacts) -> Self {
        Self {
            current: Arc::new(RwLock::new(Some(Arc::new(artifacts)))),
        }
    }

    /// Loads both artifacts from `source` and swaps them in.
    ///
    /// All-or-nothing: on error the previously loaded artifacts (if any) stay
    /// in service untouched.
    #[instrument(skip_all, fields(source = %source.describe()))]
    pub async fn load(&self, source: &dyn ArtifactSource) -> Result<Arc<Artifacts>, ArtifactError> {
        let started = Instant::now();

        let (matrix, catalog) = tokio::try_join!(source.load_similarity(), source.load_catalog())?;
        let artifacts =
            Arc::new(tokio::task::spawn_blocking(move || Artifacts::new(catalog, matrix)).await??);

        *self.current.write().await = Some(artifacts.clone());

        tracing::info!(
            catalog_size = artifacts.catalog().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Artifacts loaded"
        );

        Ok(artifacts)
    }

    /// The artifacts serving right now, if a load has completed.
    pub async fn snapshot(&self) -> Option<Arc<Artifacts>> {
        self.current.read().await.clone()
    }

    /// Looks up recommendations for `title`.
    pub async fn recommend(&self, title: &str) -> Result<Vec<String>, LookupError> {
        let artifacts = self.snapshot().await.ok_or(LookupError::NotReady)?;
        artifacts.recommend(title)
    }

    /// Response for the public endpoints: lookup misses and internal failures both render as
    /// the not-found placeholder. Only `NotReady` is passed through.
    pub async fn recommend_or_placeholder(
        &self,
        title: &str,
    ) -> Result<RecommendationResponse, LookupError> {
        match self.recommend(title).await {
            Ok(rec) => {
                tracing::debug!(title = %title, results = rec.len(), "Recommendation hit");
                Ok(RecommendationResponse { rec })
            }
            Err(LookupError::NotFound(_)) => {
                tracing::info!(title = %title, "Title not in catalog");
                Ok(RecommendationResponse::not_found())
            }
            Err(LookupError::Internal(reason)) => {
                tracing::error!(title = %title, reason = %reason, "Recommendation lookup failed");
                Ok(RecommendationResponse::not_found())
            }
            Err(LookupError::NotReady) => {
                tracing::warn!(title = %title, "Lookup before artifacts were loaded");
                Err(LookupError::NotReady)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, SimilarityMatrix};
    use crate::services::artifacts::{MockArtifactSource, StaticArtifactSource};
    use tokio_test::{assert_err, assert_ok};

    fn source(titles: &[&str], rows: Vec<Vec<f64>>) -> StaticArtifactSource {
        StaticArtifactSource::new(
            Catalog::from_titles(titles.iter().copied()),
            SimilarityMatrix::from_rows(rows).unwrap(),
        )
    }

    fn abcd() -> StaticArtifactSource {
        source(
            &["A", "B", "C", "D"],
            vec![
                vec![1.0, 0.9, 0.9, 0.1],
                vec![0.9, 1.0, 0.3, 0.2],
                vec![0.9, 0.3, 1.0, 0.4],
                vec![0.1, 0.2, 0.4, 1.0],
            ],
        )
    }

    #[tokio::test]
    async fn test_not_ready_before_load() {
        let recommender = Recommender::new();

        assert_eq!(recommender.recommend("A").await, Err(LookupError::NotReady));
        assert_eq!(
            recommender.recommend_or_placeholder("A").await,
            Err(LookupError::NotReady)
        );
    }

    #[tokio::test]
    async fn test_load_then_recommend() {
        let recommender = Recommender::new();
        assert_ok!(recommender.load(&abcd()).await);

        let response = recommender.recommend_or_placeholder("a").await.unwrap();
        assert_eq!(response.rec, vec!["B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_unknown_title_gets_placeholder() {
        let recommender = Recommender::new();
        recommender.load(&abcd()).await.unwrap();

        assert!(matches!(
            recommender.recommend("nonexistent movie").await,
            Err(LookupError::NotFound(_))
        ));
        assert_eq!(
            recommender
                .recommend_or_placeholder("nonexistent movie")
                .await
                .unwrap(),
            RecommendationResponse::not_found()
        );
    }

    #[tokio::test]
    async fn test_internal_error_gets_placeholder() {
        // Matrix larger than the catalog: the best candidate has no record.
        let corrupt = Artifacts::unchecked(
            Catalog::from_titles(["a", "b"]),
            SimilarityMatrix::from_rows(vec![
                vec![1.0, 0.1, 0.9],
                vec![0.1, 1.0, 0.2],
                vec![0.9, 0.2, 1.0],
            ])
            .unwrap(),
        );
        let recommender = Recommender::with_artifacts(corrupt);

        assert!(matches!(
            recommender.recommend("a").await,
            Err(LookupError::Internal(_))
        ));
        assert_eq!(
            recommender.recommend_or_placeholder("a").await.unwrap(),
            RecommendationResponse::not_found()
        );
    }

    #[tokio::test]
    async fn test_dimension_mismatch_refuses_to_serve() {
        let mismatched = StaticArtifactSource::new(
            Catalog::from_titles(["a", "b", "c", "d", "e", "f"]),
            SimilarityMatrix::from_shape(5, 5, vec![0.1; 25]).unwrap(),
        );
        let recommender = Recommender::new();

        let result = recommender.load(&mismatched).await;
        assert!(matches!(
            result,
            Err(ArtifactError::DimensionMismatch { .. })
        ));
        assert!(recommender.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_state() {
        let recommender = Recommender::new();
        recommender.load(&abcd()).await.unwrap();

        let mut broken = MockArtifactSource::new();
        broken.expect_describe().return_const("broken".to_string());
        broken
            .expect_load_similarity()
            .returning(|| Err(ArtifactError::MalformedMatrix("truncated".into())));
        broken
            .expect_load_catalog()
            .returning(|| Ok(Catalog::from_titles(["x"])));

        assert_err!(recommender.load(&broken).await);
        assert_eq!(
            recommender.recommend("A").await.unwrap(),
            vec!["B", "C", "D"]
        );
    }

    #[tokio::test]
    async fn test_reload_swaps_everything() {
        let recommender = Recommender::new();
        recommender.load(&abcd()).await.unwrap();
        let before = recommender.snapshot().await.unwrap();

        let replacement = source(&["x", "y"], vec![vec![1.0, 0.5], vec![0.5, 1.0]]);
        recommender.load(&replacement).await.unwrap();

        assert!(matches!(
            recommender.recommend("A").await,
            Err(LookupError::NotFound(_))
        ));
        assert_eq!(recommender.recommend("X").await.unwrap(), vec!["y"]);
        // An in-flight snapshot taken before the reload still sees the old load.
        assert_eq!(before.recommend("A").unwrap(), vec!["B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_concurrent_readers() {
        let recommender = Recommender::new();
        recommender.load(&abcd()).await.unwrap();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let recommender = recommender.clone();
                tokio::spawn(async move { recommender.recommend("D").await })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), vec!["C", "B", "A"]);
        }
    }
}
