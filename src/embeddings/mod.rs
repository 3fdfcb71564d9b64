// Embeddings: provider abstraction, the HTTP provider, and the store that
// pairs records with their vectors.
//
// The EmbeddingProvider trait is the only network seam in the pipeline.
// OpenAiProvider implements it over HTTP; tests swap in deterministic fakes.

pub mod matrix;
pub mod openai;
pub mod store;
pub mod traits;

pub use matrix::EmbeddingMatrix;
pub use store::EmbeddingStore;
pub use traits::EmbeddingProvider;

/// Embedding width of text-embedding-ada-002.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Default embedding model name.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
