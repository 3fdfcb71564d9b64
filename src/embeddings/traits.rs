// Embedding provider trait: the swap-ready network boundary.
//
// A provider turns an ordered batch of texts into an ordered batch of
// vectors. Credentials belong to the implementation's constructor; nothing
// here looks at the environment.

use async_trait::async_trait;

use crate::error::PipelineResult;

/// Trait for turning texts into dense vectors. Async because real providers
/// are HTTP APIs.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed all `texts` with `model` in a single request.
    ///
    /// Implementations must return vectors in the same order as `texts`.
    /// The store still checks count and width of whatever comes back.
    async fn embed_batch(&self, model: &str, texts: &[String]) -> PipelineResult<Vec<Vec<f64>>>;
}
