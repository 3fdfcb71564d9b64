// Pipeline error kinds.
//
// The numeric core (store, similarity, projection) returns these typed
// errors so callers and tests can tell a bad index from a bad provider
// response. The CLI and I/O glue wrap them in anyhow like everything else.

use thiserror::Error;

/// Everything that can go wrong inside the embedding → similarity →
/// projection pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// Embedding count or width disagrees with what was requested.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Neighbor lookup with an invalid record index or neighbor count.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    /// A parameter outside its valid range (e.g. projection component count).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Network, auth, or HTTP failure from the embedding provider.
    #[error("embedding provider error: {0}")]
    ProviderError(String),

    /// A zero-norm row was found while normalizing.
    #[error("degenerate vector: row {row} has zero L2 norm")]
    DegenerateVector { row: usize },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
