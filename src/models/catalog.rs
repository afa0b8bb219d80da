use std::collections::HashMap;
use std::io::Read;

use crate::error::ArtifactError;

/// A single catalog record.
///
/// The catalog schema puts the title in column 0; the remaining columns are
/// kept verbatim but never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    /// Row index in the catalog, which is also the matrix row/column
    pub position: usize,
    /// All CSV fields in column order
    pub fields: Vec<String>,
}

impl Movie {
    pub fn new(position: usize, fields: Vec<String>) -> Self {
        Self { position, fields }
    }

    /// The title column (column 0)
    pub fn title(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }
}

/// Ordered list of movies whose positions line up with the similarity matrix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    columns: Vec<String>,
    movies: Vec<Movie>,
}

impl Catalog {
    /// Builds a single-column catalog from titles, in order.
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let movies = titles
            .into_iter()
            .enumerate()
            .map(|(position, title)| Movie::new(position, vec![title.into()]))
            .collect();

        Self {
            columns: vec!["title".to_string()],
            movies,
        }
    }

    /// Parses a catalog CSV with a header row.
    ///
    /// `context` names the source in error messages (usually the file path).
    pub fn from_csv_reader<R: Read>(reader: R, context: &str) -> Result<Self, ArtifactError> {
        let mut reader = csv::Reader::from_reader(reader);
        let csv_error = |source| ArtifactError::Csv {
            context: context.to_string(),
            source,
        };

        let columns = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut movies = Vec::new();
        for (position, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            movies.push(Movie::new(
                position,
                record.iter().map(str::to_string).collect(),
            ));
        }

        Ok(Self { columns, movies })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Movie> {
        self.movies.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }
}

/// Lower-cased title to catalog position. Duplicate titles resolve to the
/// first occurrence.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    positions: HashMap<String, usize>,
}

impl TitleIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut positions = HashMap::with_capacity(catalog.len());
        for movie in catalog.iter() {
            positions
                .entry(movie.title().to_lowercase())
                .or_insert(movie.position);
        }
        Self { positions }
    }

    /// Case-insensitive exact match; no trimming.
    pub fn resolve(&self, title: &str) -> Option<usize> {
        self.positions.get(&title.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
