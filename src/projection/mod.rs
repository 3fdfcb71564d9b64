// Projection engine: truncated PCA via randomized SVD.
//
// PCA of an N×D matrix is the SVD of its mean-centered version: the right
// singular vectors are the component loadings and U·Σ are the projected
// coordinates. For 1000×1536 embeddings we only want the top handful of
// components, so instead of a full decomposition we find a small basis for
// the dominant subspace (randomized.rs) and decompose the projected
// (k + oversamples)-sized problem exactly (linalg.rs).
//
// Component signs are arbitrary in any SVD. We flip each component so its
// largest-magnitude loading is positive, which makes runs with the same seed
// comparable, but nothing downstream should depend on sign.

pub mod linalg;
pub mod randomized;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::{debug, info};

use crate::embeddings::EmbeddingMatrix;
use crate::error::{PipelineError, PipelineResult};

/// Singular values below this fraction of the largest are treated as zero.
const RANK_TOLERANCE: f64 = 1e-10;

/// Tuning knobs for [`project_with`].
#[derive(Debug, Clone)]
pub struct ProjectionOptions {
    /// Subtract the column mean before decomposing (standard PCA).
    pub center: bool,
    /// Extra sketch columns beyond k (default 10).
    pub oversamples: usize,
    /// Power iterations; `None` picks 7 for very small k, else 4.
    pub power_iterations: Option<usize>,
    /// Seed for the random test matrix.
    pub seed: u64,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            center: true,
            oversamples: 10,
            power_iterations: None,
            seed: 42,
        }
    }
}

/// The fitted decomposition. Computed once, never mutated.
#[derive(Debug, Clone)]
pub struct ProjectionResult {
    /// k × D, one loading vector per row
    components: Array2<f64>,
    /// N × k projected coordinates
    coordinates: Array2<f64>,
    /// Column mean subtracted before fitting (all zeros when not centered)
    mean: Array1<f64>,
    singular_values: Vec<f64>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl ProjectionResult {
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Component loading vectors, one D-dimensional row per component.
    pub fn components(&self) -> ArrayView2<'_, f64> {
        self.components.view()
    }

    /// Projected coordinates, one row per record.
    pub fn coordinates(&self) -> ArrayView2<'_, f64> {
        self.coordinates.view()
    }

    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    pub fn singular_values(&self) -> &[f64] {
        &self.singular_values
    }

    /// Variance captured by each component (σ² / (N − 1)).
    pub fn explained_variance(&self) -> &[f64] {
        &self.explained_variance
    }

    /// Fraction of total variance captured by each component.
    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    /// Map the coordinates back into the (centered) embedding space.
    pub fn reconstruct(&self) -> Array2<f64> {
        self.coordinates.dot(&self.components)
    }

    /// Project new rows with the fitted mean and components.
    pub fn transform(&self, matrix: &EmbeddingMatrix) -> PipelineResult<Array2<f64>> {
        if matrix.dim() != self.mean.len() {
            return Err(PipelineError::DimensionMismatch(format!(
                "projection was fitted on width {}, got width {}",
                self.mean.len(),
                matrix.dim()
            )));
        }
        let centered = &matrix.view() - &self.mean;
        Ok(centered.dot(&self.components.t()))
    }
}

/// Truncated PCA with default options (mean-centered, seed 42).
pub fn project(matrix: &EmbeddingMatrix, k: usize) -> PipelineResult<ProjectionResult> {
    project_with(matrix, k, &ProjectionOptions::default())
}

/// Truncated PCA of `matrix` keeping `k` components.
///
/// `k` must satisfy `1 <= k <= min(N, D)`; anything else fails with
/// `InvalidParameter`.
pub fn project_with(
    matrix: &EmbeddingMatrix,
    k: usize,
    options: &ProjectionOptions,
) -> PipelineResult<ProjectionResult> {
    let (n, d) = (matrix.n_rows(), matrix.dim());
    let max_k = n.min(d);
    if k == 0 || k > max_k {
        return Err(PipelineError::InvalidParameter(format!(
            "component count {k} must be between 1 and min(N, D) = {max_k}"
        )));
    }

    let a = matrix.view();
    let mean = if options.center {
        a.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(d))
    } else {
        Array1::zeros(d)
    };
    let centered = &a - &mean;

    let sketch = (k + options.oversamples).min(max_k);
    let power_iterations = options.power_iterations.unwrap_or({
        if (k as f64) < 0.1 * max_k as f64 {
            7
        } else {
            4
        }
    });

    let q = randomized::range_finder(centered.view(), sketch, power_iterations, options.seed);

    // B = Qᵀ·A is small (≤ sketch × D); its left singular vectors come from
    // the eigenvectors of B·Bᵀ, and each right singular vector is Bᵀ·u / σ.
    let b = q.t().dot(&centered);
    let (_, eigvecs) = linalg::symmetric_eigen(&b.dot(&b.t()));

    let mut components = Array2::<f64>::zeros((k, d));
    let mut singular_values = vec![0.0; k];
    let mut largest = 0.0_f64;

    for i in 0..k.min(eigvecs.ncols()) {
        let v = b.t().dot(&eigvecs.column(i));
        let sigma = v.dot(&v).sqrt();
        largest = largest.max(sigma);
        if sigma <= largest * RANK_TOLERANCE || sigma == 0.0 {
            continue;
        }
        components.row_mut(i).assign(&(v / sigma));
        singular_values[i] = sigma;
    }

    flip_signs(&mut components);

    let coordinates = centered.dot(&components.t());

    let dof = n.saturating_sub(1).max(1) as f64;
    let total_variance: f64 = centered.iter().map(|x| x * x).sum::<f64>() / dof;
    let explained_variance: Vec<f64> = singular_values.iter().map(|s| s * s / dof).collect();
    let explained_variance_ratio = explained_variance
        .iter()
        .map(|ev| {
            if total_variance > 0.0 {
                ev / total_variance
            } else {
                0.0
            }
        })
        .collect();

    debug!(
        sketch = sketch,
        rank = q.ncols(),
        singular_values = ?singular_values,
        "Randomized SVD"
    );
    info!(records = n, dim = d, components = k, "Computed projection");

    Ok(ProjectionResult {
        components,
        coordinates,
        mean,
        singular_values,
        explained_variance,
        explained_variance_ratio,
    })
}

/// Make the largest-magnitude loading of every component positive.
fn flip_signs(components: &mut Array2<f64>) {
    for mut row in components.axis_iter_mut(Axis(0)) {
        let pivot = row
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        if pivot < 0.0 {
            row.mapv_inplace(|x| -x);
        }
    }
}
