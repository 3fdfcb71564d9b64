// Similarity engine: L2 normalization, the all-pairs cosine matrix, and
// ranked nearest-neighbor lookup.
//
// Cosine similarity of two vectors is the dot product of their unit-length
// versions, so once every row is normalized the whole N×N matrix is a single
// matrix product. Ranking lives in ranking.rs.

pub mod ranking;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embeddings::EmbeddingMatrix;
use crate::error::{PipelineError, PipelineResult};

pub use ranking::{nearest, nearest_all, Neighbor};

/// What to do with a row whose L2 norm is zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ZeroVectorPolicy {
    /// Fail with `DegenerateVector`.
    #[default]
    Reject,
    /// Keep the row as all zeros: similarity 0.0 to every record, itself
    /// included.
    Zero,
}

/// Symmetric N×N matrix of cosine similarities.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    data: Array2<f64>,
}

impl SimilarityMatrix {
    /// Number of records (N).
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

/// Divide every row by its L2 norm. All-zero rows (and rows holding an
/// infinity) fail with `DegenerateVector`; tiny non-zero rows are fine.
pub fn normalize(matrix: &EmbeddingMatrix) -> PipelineResult<EmbeddingMatrix> {
    normalize_with(matrix, ZeroVectorPolicy::Reject)
}

/// Divide every row by its L2 norm, handling zero-norm rows per `policy`.
pub fn normalize_with(
    matrix: &EmbeddingMatrix,
    policy: ZeroVectorPolicy,
) -> PipelineResult<EmbeddingMatrix> {
    let mut data = matrix.view().to_owned();
    let mut zero_rows = 0usize;

    for (i, mut row) in data.axis_iter_mut(Axis(0)).enumerate() {
        // Scale by the largest entry first so tiny rows don't underflow.
        let scale = row.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if scale == 0.0 || !scale.is_finite() {
            match policy {
                ZeroVectorPolicy::Reject => return Err(PipelineError::DegenerateVector { row: i }),
                ZeroVectorPolicy::Zero => {
                    row.fill(0.0);
                    zero_rows += 1;
                }
            }
        } else {
            row /= scale;
            let norm = row.dot(&row).sqrt();
            row /= norm;
        }
    }

    if zero_rows > 0 {
        debug!(zero_rows = zero_rows, "Kept zero-norm rows as zero vectors");
    }

    EmbeddingMatrix::from_array(data)
}

/// Compute `normalized · normalizedᵀ`.
///
/// Expects unit-length (or zero) rows, as produced by [`normalize`]. The
/// result is mirrored from the upper triangle so it is exactly symmetric, and
/// entries are clamped into [-1, 1] to absorb rounding.
pub fn similarity_matrix(normalized: &EmbeddingMatrix) -> SimilarityMatrix {
    let a = normalized.view();
    let mut data = a.dot(&a.t());
    let n = data.nrows();

    for i in 0..n {
        data[[i, i]] = data[[i, i]].clamp(-1.0, 1.0);
        for j in (i + 1)..n {
            let v = data[[i, j]].clamp(-1.0, 1.0);
            data[[i, j]] = v;
            data[[j, i]] = v;
        }
    }

    debug!(records = n, "Computed similarity matrix");
    SimilarityMatrix { data }
}
