//! Artifact storage abstraction
//!
//! The catalog and the similarity matrix are built offline and read once at
//! startup (and on reload). Sources only fetch and parse; cross-checking the
//! two artifacts against each other happens when they are combined.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::{
    config::Config,
    error::ArtifactError,
    models::{Catalog, SimilarityMatrix},
};

pub mod npy;

/// Trait for artifact storage backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Fetch and parse the catalog table
    async fn load_catalog(&self) -> Result<Catalog, ArtifactError>;

    /// Fetch and parse the square similarity matrix
    async fn load_similarity(&self) -> Result<SimilarityMatrix, ArtifactError>;

    /// Source description for logging
    fn describe(&self) -> String;
}

/// Reads artifacts from the local filesystem
#[derive(Debug, Clone)]
pub struct FileArtifactSource {
    similarity_path: PathBuf,
    catalog_path: PathBuf,
}

impl FileArtifactSource {
    pub fn new(similarity_path: impl Into<PathBuf>, catalog_path: impl Into<PathBuf>) -> Self {
        Self {
            similarity_path: similarity_path.into(),
            catalog_path: catalog_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.similarity_matrix_path.clone(),
            config.catalog_path.clone(),
        )
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    tokio::fs::read(path).await.map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[async_trait::async_trait]
impl ArtifactSource for FileArtifactSource {
    #[instrument(skip(self), fields(path = %self.catalog_path.display()))]
    async fn load_catalog(&self) -> Result<Catalog, ArtifactError> {
        let bytes = read_file(&self.catalog_path).await?;
        let context = self.catalog_path.display().to_string();
        let catalog = tokio::task::spawn_blocking(move || {
            Catalog::from_csv_reader(bytes.as_slice(), &context)
        })
        .await??;
        tracing::debug!(records = catalog.len(), "Catalog parsed");
        Ok(catalog)
    }

    #[instrument(skip(self), fields(path = %self.similarity_path.display()))]
    async fn load_similarity(&self) -> Result<SimilarityMatrix, ArtifactError> {
        let bytes = read_file(&self.similarity_path).await?;
        let is_npy = self
            .similarity_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("npy"));

        let context = self.similarity_path.display().to_string();

        // Parsing a large matrix is CPU-bound; keep it off the runtime workers.
        let matrix = tokio::task::spawn_blocking(move || {
            if is_npy {
                npy::parse(&bytes)
            } else {
                parse_matrix_csv(bytes.as_slice(), &context)
            }
        })
        .await??;
        tracing::debug!(size = matrix.len(), "Similarity matrix parsed");
        Ok(matrix)
    }

    fn describe(&self) -> String {
        format!(
            "files(similarity={}, catalog={})",
            self.similarity_path.display(),
            self.catalog_path.display()
        )
    }
}

/// Parses a headerless CSV of decimal scores, one matrix row per line.
pub fn parse_matrix_csv<R: Read>(
    reader: R,
    context: &str,
) -> Result<SimilarityMatrix, ArtifactError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ArtifactError::Csv {
            context: context.to_string(),
            source,
        })?;
        let row = record
            .iter()
            .map(|value| {
                value.trim().parse::<f64>().map_err(|_| {
                    ArtifactError::MalformedMatrix(format!(
                        "{context}: line {} has non-numeric score {value:?}",
                        line + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    SimilarityMatrix::from_rows(rows)
}

/// Serves artifacts that are already in memory
#[derive(Debug, Clone)]
pub struct StaticArtifactSource {
    catalog: Catalog,
    similarity: SimilarityMatrix,
}

impl StaticArtifactSource {
    pub fn new(catalog: Catalog, similarity: SimilarityMatrix) -> Self {
        Self {
            catalog,
            similarity,
        }
    }
}

#[async_trait::async_trait]
impl ArtifactSource for StaticArtifactSource {
    async fn load_catalog(&self) -> Result<Catalog, ArtifactError> {
        Ok(self.catalog.clone())
    }

    async fn load_similarity(&self) -> Result<SimilarityMatrix, ArtifactError> {
        Ok(self.similarity.clone())
    }

    fn describe(&self) -> String {
        format!("static({} records)", self.catalog.len())
    }
}
