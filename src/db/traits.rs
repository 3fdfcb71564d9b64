// Database trait: backend-agnostic async interface for all DB operations.
//
// Implementors: SqliteDatabase (wraps rusqlite). Methods are async so a sync
// backend (rusqlite behind a Mutex) and a native async one fit behind the
// same interface.

use anyhow::Result;
use async_trait::async_trait;

use super::models::RunMeta;
use crate::embeddings::EmbeddingStore;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Embedding runs ---

    /// Replace the stored run with this store's records and vectors.
    async fn save_run(&self, meta: &RunMeta, store: &EmbeddingStore) -> Result<()>;

    /// Load the stored run, revalidating the record/vector pairing.
    async fn load_run(&self) -> Result<Option<(RunMeta, EmbeddingStore)>>;

    /// Metadata of the stored run, without loading any vectors.
    async fn get_run_meta(&self) -> Result<Option<RunMeta>>;

    /// Number of stored records.
    async fn record_count(&self) -> Result<i64>;
}
