use crate::error::ArtifactError;

/// Square, row-major matrix of pairwise similarity scores.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds a matrix from row-major scores with the given shape.
    ///
    /// Rejects non-square shapes, a score count that doesn't match the shape,
    /// and NaN or infinite scores.
    pub fn from_shape(rows: usize, cols: usize, scores: Vec<f64>) -> Result<Self, ArtifactError> {
        if rows != cols {
            return Err(ArtifactError::NotSquare { rows, cols });
        }
        if scores.len() != rows * cols {
            return Err(ArtifactError::MalformedMatrix(format!(
                "expected {} scores for a {}x{} matrix, found {}",
                rows * cols,
                rows,
                cols,
                scores.len()
            )));
        }
        if let Some(offset) = scores.iter().position(|score| !score.is_finite()) {
            return Err(ArtifactError::NonFiniteScore {
                row: offset / cols,
                col: offset % cols,
            });
        }

        Ok(Self { size: rows, scores })
    }

    /// Builds a matrix from explicit rows; every row must be as long as there are rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ArtifactError> {
        let n = rows.len();
        let mut scores = Vec::with_capacity(n * n);
        for row in rows {
            if row.len() != n {
                return Err(ArtifactError::NotSquare {
                    rows: n,
                    cols: row.len(),
                });
            }
            scores.extend(row);
        }
        Self::from_shape(n, n, scores)
    }

    /// Side length N
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Scores of `position` against every catalog position
    pub fn row(&self, position: usize) -> Option<&[f64]> {
        if position >= self.size {
            return None;
        }
        let start = position * self.size;
        self.scores.get(start..start + self.size)
    }
}
