use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::{
    error::{ArtifactError, LookupError},
    models::{Catalog, SimilarityMatrix, TitleIndex},
};

/// Ranks considered after dropping rank 0
pub const CANDIDATE_WINDOW: usize = 10;

/// Titles returned per lookup
pub const RESULT_SIZE: usize = 3;

/// One consistent load of the catalog, its similarity matrix and the derived
/// title index. Never mutated once built.
#[derive(Debug)]
pub struct Artifacts {
    catalog: Catalog,
    matrix: SimilarityMatrix,
    index: TitleIndex,
    loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Cross-checks the artifacts and builds the title index.
    pub fn new(catalog: Catalog, matrix: SimilarityMatrix) -> Result<Self, ArtifactError> {
        if catalog.is_empty() {
            return Err(ArtifactError::EmptyCatalog);
        }
        if matrix.len() != catalog.len() {
            return Err(ArtifactError::DimensionMismatch {
                matrix: matrix.len(),
                catalog: catalog.len(),
            });
        }

        let index = TitleIndex::build(&catalog);

        Ok(Self {
            catalog,
            matrix,
            index,
            loaded_at: Utc::now(),
        })
    }

    /// Skips the cross-checks, for exercising corrupt state.
    #[cfg(test)]
    pub(crate) fn unchecked(catalog: Catalog, matrix: SimilarityMatrix) -> Self {
        let index = TitleIndex::build(&catalog);
        Self {
            catalog,
            matrix,
            index,
            loaded_at: Utc::now(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Titles most similar to `title`, best first, at most [`RESULT_SIZE`].
    pub fn recommend(&self, title: &str) -> Result<Vec<String>, LookupError> {
        let position = self
            .index
            .resolve(title)
            .ok_or_else(|| LookupError::NotFound(title.to_string()))?;

        self.candidates(position)?
            .into_iter()
            .take(RESULT_SIZE)
            .map(|candidate| {
                self.catalog
                    .get(candidate)
                    .map(|movie| movie.title().to_string())
                    .ok_or_else(|| {
                        LookupError::Internal(format!("candidate {candidate} is not in the catalog"))
                    })
            })
            .collect()
    }

    /// Positions ranked 1..=[`CANDIDATE_WINDOW`] for the row at `position`.
    ///
    /// The row is stable-sorted by descending score, so equal scores keep
    /// catalog order; `-0.0` and `0.0` tie. Rank 0 is dropped by position, not by identity: if
    /// another movie ties the self-score and precedes it in the catalog, that
    /// movie is the one dropped.
    pub fn candidates(&self, position: usize) -> Result<Vec<usize>, LookupError> {
        let row = self.matrix.row(position).ok_or_else(|| {
            LookupError::Internal(format!("no similarity row for position {position}"))
        })?;

        let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
        // Scores are finite (checked at load), so partial_cmp is total here.
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        Ok(ranked
            .into_iter()
            .skip(1)
            .take(CANDIDATE_WINDOW)
            .map(|(candidate, _)| candidate)
            .collect())
    }
}
