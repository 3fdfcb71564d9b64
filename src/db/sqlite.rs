// SqliteDatabase: rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::RunMeta;
use super::traits::Database;
use crate::embeddings::EmbeddingStore;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn save_run(&self, meta: &RunMeta, store: &EmbeddingStore) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::save_run(&conn, meta, store.records(), store.vectors())
    }

    async fn load_run(&self) -> Result<Option<(RunMeta, EmbeddingStore)>> {
        let conn = self.conn.lock().await;
        let Some(meta) = super::queries::get_run_meta(&conn)? else {
            return Ok(None);
        };
        let (records, vectors) = super::queries::get_records(&conn)?;
        let store = EmbeddingStore::from_parts(records, vectors, Some(meta.dimension))?;
        Ok(Some((meta, store)))
    }

    async fn get_run_meta(&self) -> Result<Option<RunMeta>> {
        let conn = self.conn.lock().await;
        super::queries::get_run_meta(&conn)
    }

    async fn record_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::record_count(&conn)
    }
}
