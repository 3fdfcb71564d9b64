// Analysis pipeline: similarity rankings and PCA over the same matrix.
//
// Both stages only read the EmbeddingMatrix, so they share it through an Arc
// and run side by side on the blocking pool. Neither result depends on the
// other.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::embeddings::EmbeddingMatrix;
use crate::error::PipelineResult;
use crate::projection::{self, ProjectionOptions, ProjectionResult};
use crate::similarity::{self, Neighbor, SimilarityMatrix, ZeroVectorPolicy};

/// Output of a full analysis run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Top neighbors for every record, in record order
    pub rankings: Vec<Vec<Neighbor>>,
    pub projection: ProjectionResult,
}

/// Normalize and build the similarity matrix.
pub fn similarity(
    matrix: &EmbeddingMatrix,
    policy: ZeroVectorPolicy,
) -> PipelineResult<SimilarityMatrix> {
    let normalized = similarity::normalize_with(matrix, policy)?;
    Ok(similarity::similarity_matrix(&normalized))
}

/// Top `k` neighbors of one record.
pub fn similar_to(
    matrix: &EmbeddingMatrix,
    index: usize,
    k: usize,
    policy: ZeroVectorPolicy,
) -> PipelineResult<Vec<Neighbor>> {
    let sim = similarity(matrix, policy)?;
    similarity::nearest(&sim, index, k)
}

/// Run both stages concurrently.
///
/// `neighbors` is clamped to N − 1 so small samples still get a full
/// ranking; `components` is passed through and validated by the projection.
pub async fn run(
    matrix: Arc<EmbeddingMatrix>,
    neighbors: usize,
    components: usize,
    policy: ZeroVectorPolicy,
    options: ProjectionOptions,
) -> Result<Analysis> {
    let neighbors = neighbors.min(matrix.n_rows().saturating_sub(1));

    let sim_matrix = Arc::clone(&matrix);
    let ranking_task = tokio::task::spawn_blocking(move || {
        let sim = similarity(&sim_matrix, policy)?;
        similarity::nearest_all(&sim, neighbors)
    });

    let proj_matrix = Arc::clone(&matrix);
    let projection_task = tokio::task::spawn_blocking(move || {
        projection::project_with(&proj_matrix, components, &options)
    });

    let (rankings, projection) = tokio::join!(ranking_task, projection_task);
    let rankings = rankings.context("Similarity task panicked")??;
    let projection = projection.context("Projection task panicked")??;

    info!(
        records = matrix.n_rows(),
        neighbors = neighbors,
        components = projection.n_components(),
        "Analysis complete"
    );

    Ok(Analysis {
        rankings,
        projection,
    })
}
