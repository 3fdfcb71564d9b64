// EmbeddingMatrix: N records × D dimensions, read-only after construction.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::{PipelineError, PipelineResult};

/// All embedding vectors of a run stacked row-wise, in record order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingMatrix {
    data: Array2<f64>,
}

impl EmbeddingMatrix {
    /// Stack equal-length rows into a matrix.
    ///
    /// Fails with `DimensionMismatch` when rows differ in width and with
    /// `InvalidParameter` when there are no rows or the rows are empty.
    pub fn from_rows(rows: &[Vec<f64>]) -> PipelineResult<Self> {
        let Some(first) = rows.first() else {
            return Err(PipelineError::InvalidParameter(
                "cannot build a matrix from zero vectors".to_string(),
            ));
        };
        let dim = first.len();
        if dim == 0 {
            return Err(PipelineError::InvalidParameter(
                "embedding vectors must have at least one dimension".to_string(),
            ));
        }

        let mut flat = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(PipelineError::DimensionMismatch(format!(
                    "row {i} has width {}, expected {dim}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }

        let data = Array2::from_shape_vec((rows.len(), dim), flat)
            .map_err(|e| PipelineError::DimensionMismatch(e.to_string()))?;
        Ok(Self { data })
    }

    /// Wrap an existing array. Fails on an empty shape.
    pub fn from_array(data: Array2<f64>) -> PipelineResult<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(PipelineError::InvalidParameter(format!(
                "matrix shape {:?} is empty",
                data.dim()
            )));
        }
        Ok(Self { data })
    }

    /// Number of records (N).
    pub fn n_rows(&self) -> usize {
        self.data.nrows()
    }

    /// Embedding width (D).
    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}
