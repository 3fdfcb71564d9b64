// Database layer: SQLite storage for the embedded sample.
//
// Embedding costs a network round trip and API credit, so one `embed` run is
// persisted (records, vectors, and what produced them) and every analysis
// command reads it back. We use rusqlite with the "bundled" feature so
// there's no system SQLite dependency. The database file lives wherever
// DREADMAP_DB_PATH points (defaults to ./dreadmap.db).

pub mod models;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use traits::Database;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

/// Create the database file (and its parent directory) if needed, then
/// bring the schema up to date. Used by `init` and `embed`.
pub fn initialize(db_path: &str) -> Result<Connection> {
    let parent = Path::new(db_path).parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory for database: {db_path}"))?;
    }

    let conn = connect(db_path)?;
    schema::create_tables(&conn)?;
    Ok(conn)
}

/// Open a database that `initialize` already created; never creates one.
pub fn open(db_path: &str) -> Result<Connection> {
    if !Path::new(db_path).exists() {
        anyhow::bail!("Database not found at {db_path}. Run `dreadmap init` first.");
    }
    connect(db_path)
}

/// Open the file in WAL journal mode.
fn connect(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database at {db_path}"))?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    Ok(conn)
}

/// Create the database if needed and wrap it behind the Database trait.
pub fn initialize_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = initialize(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

/// Open an existing database behind the Database trait.
pub fn open_sqlite(db_path: &str) -> Result<Arc<dyn Database>> {
    let conn = open(db_path)?;
    Ok(Arc::new(sqlite::SqliteDatabase::new(conn)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("dreadmap_db_{}_{}", std::process::id(), name))
            .join("nested")
            .join("dreadmap.db")
    }

    #[test]
    fn test_open_requires_initialize() {
        let path = temp_db("open");
        let path_str = path.to_str().unwrap();
        assert!(open(path_str).is_err());

        initialize(path_str).unwrap();
        let conn = open(path_str).unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        assert_eq!(schema::table_count(&conn).unwrap(), 3);

        drop(conn);
        std::fs::remove_dir_all(path.parent().unwrap().parent().unwrap()).ok();
    }
}
