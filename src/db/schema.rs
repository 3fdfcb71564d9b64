// Database schema: table creation.
//
// A `schema_version` table tracks which version of the layout the file was
// created with, so a later layout change can migrate in place.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables if they don't exist yet.
///
/// This is idempotent and runs on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Tracks schema version for future migrations
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- What produced the stored embeddings (singleton row)
        CREATE TABLE IF NOT EXISTS run_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            model TEXT NOT NULL,
            dimension INTEGER NOT NULL,
            sample_size INTEGER NOT NULL,
            seed INTEGER NOT NULL,
            source TEXT NOT NULL,             -- dataset path the sample came from
            embedded_at TEXT NOT NULL         -- RFC 3339
        );

        -- Sampled records with their embedding, keyed by position.
        -- Position is the join key between a record and its vector.
        CREATE TABLE IF NOT EXISTS records (
            position INTEGER PRIMARY KEY,
            id TEXT NOT NULL,
            title TEXT NOT NULL,
            text TEXT NOT NULL,
            language TEXT NOT NULL,
            rating REAL,
            embedding TEXT NOT NULL           -- JSON array of floats
        );

        -- Lookup by source identifier (`dreadmap similar <ID>`)
        CREATE INDEX IF NOT EXISTS idx_records_id
            ON records(id);
        ",
    )
    .context("Failed to create database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}
