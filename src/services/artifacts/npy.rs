//! Similarity matrices saved with `np.save`.
//!
//! Only 2-D, C-ordered `float64`/`float32` arrays are accepted; everything
//! else is reported as a malformed matrix.

use npyz::{DType, NpyFile, Order};

use crate::{error::ArtifactError, models::SimilarityMatrix};

fn malformed(reason: impl Into<String>) -> ArtifactError {
    ArtifactError::MalformedMatrix(reason.into())
}

fn io_malformed(e: std::io::Error) -> ArtifactError {
    malformed(format!("unreadable NPY data: {e}"))
}

/// Parses the bytes of a `.npy` file into a similarity matrix.
pub fn parse(bytes: &[u8]) -> Result<SimilarityMatrix, ArtifactError> {
    let npy = NpyFile::new(bytes).map_err(io_malformed)?;

    if matches!(npy.order(), Order::Fortran) {
        return Err(malformed("Fortran-ordered arrays are not supported"));
    }

    let (rows, cols) = match npy.shape() {
        [rows, cols] => (dimension(*rows)?, dimension(*cols)?),
        shape => {
            return Err(malformed(format!(
                "expected a 2-D array, found {} dimensions",
                shape.len()
            )))
        }
    };

    let descr = match npy.dtype() {
        DType::Plain(type_str) => type_str.to_string(),
        other => return Err(malformed(format!("unsupported dtype {other:?}"))),
    };

    let scores: Vec<f64> = match descr.as_str() {
        "<f8" | ">f8" => npy.into_vec::<f64>().map_err(io_malformed)?,
        "<f4" | ">f4" => npy
            .into_vec::<f32>()
            .map_err(io_malformed)?
            .into_iter()
            .map(f64::from)
            .collect(),
        other => return Err(malformed(format!("unsupported dtype {other:?}"))),
    };

    SimilarityMatrix::from_shape(rows, cols, scores)
}

fn dimension(value: u64) -> Result<usize, ArtifactError> {
    usize::try_from(value).map_err(|_| malformed(format!("shape dimension {value} is too large")))
}

/// Encodes a matrix as a version 1.0 `<f8` file, as `np.save` would.
#[cfg(test)]
pub(crate) fn encode_f64(rows: usize, cols: usize, scores: &[f64]) -> Vec<u8> {
    let data: Vec<u8> = scores.iter().flat_map(|score| score.to_le_bytes()).collect();
    tests::with_header(
        1,
        &format!("{{'descr': '<f8', 'fortran_order': False, 'shape': ({rows}, {cols}), }}"),
        &data,
    )
}
