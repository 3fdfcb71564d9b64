// EmbeddingStore: records paired with their vectors, by position.
//
// Position is the join key between a record and its vector. That pairing is
// only trustworthy if the provider returned exactly one vector per input and
// every vector has the same width, so both are checked here, at the
// boundary, before anything downstream sees the data.

use tracing::{debug, info};

use super::matrix::EmbeddingMatrix;
use super::traits::EmbeddingProvider;
use crate::dataset::Record;
use crate::error::{PipelineError, PipelineResult};

/// One vector per record, in record order. Immutable after construction.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    records: Vec<Record>,
    vectors: Vec<Vec<f64>>,
    dim: usize,
}

impl EmbeddingStore {
    /// Embed every record's text with one batched provider request.
    ///
    /// `expected_dim` pins the vector width; when `None`, the width of the
    /// first returned vector is used and every other vector must match it.
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        model: &str,
        records: Vec<Record>,
        expected_dim: Option<usize>,
    ) -> PipelineResult<Self> {
        if records.is_empty() {
            return Err(PipelineError::InvalidParameter(
                "no records to embed".to_string(),
            ));
        }

        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();

        info!(
            model = model,
            count = texts.len(),
            "Requesting embeddings"
        );

        let vectors = provider.embed_batch(model, &texts).await?;
        Self::from_parts(records, vectors, expected_dim)
    }

    /// Pair already-computed vectors with their records, validating the
    /// count and width invariants.
    pub fn from_parts(
        records: Vec<Record>,
        vectors: Vec<Vec<f64>>,
        expected_dim: Option<usize>,
    ) -> PipelineResult<Self> {
        if vectors.len() != records.len() {
            return Err(PipelineError::DimensionMismatch(format!(
                "expected {} vectors (one per record), got {}",
                records.len(),
                vectors.len()
            )));
        }

        let dim = match (expected_dim, vectors.first()) {
            (Some(d), _) => d,
            (None, Some(first)) => first.len(),
            (None, None) => 0,
        };

        if let Some((i, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
            return Err(PipelineError::DimensionMismatch(format!(
                "vector {i} (record {}) has width {}, expected {dim}",
                records[i].id,
                v.len()
            )));
        }

        debug!(records = records.len(), dim = dim, "Built embedding store");

        Ok(Self {
            records,
            vectors,
            dim,
        })
    }

    /// Stack the vectors into an N×D matrix in record order.
    pub fn assemble_matrix(&self) -> PipelineResult<EmbeddingMatrix> {
        EmbeddingMatrix::from_rows(&self.vectors)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vector width shared by every record.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn vectors(&self) -> &[Vec<f64>] {
        &self.vectors
    }

    /// Position of the record with the given source identifier.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}
