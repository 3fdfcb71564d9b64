// Data models: Rust structs that map to database rows.
//
// Kept separate from the queries so the pipeline and status display can use
// them without depending on rusqlite directly.

use serde::{Deserialize, Serialize};

/// Provenance of the stored embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Embedding model name sent to the provider
    pub model: String,
    /// Width of every stored vector
    pub dimension: usize,
    /// Requested sample size (the stored count may be smaller)
    pub sample_size: usize,
    /// Seed used to draw the sample
    pub seed: u64,
    /// Dataset path the sample was drawn from
    pub source: String,
    /// RFC 3339 timestamp of the embedding request
    pub embedded_at: String,
}
