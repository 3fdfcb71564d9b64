// Database queries: all SQL lives here.
//
// Records are keyed by their position in the sample, which is also their
// row in the embedding matrix. Vectors are stored as JSON arrays.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::RunMeta;
use crate::dataset::Record;

// --- Run metadata ---

/// Load the stored run metadata, if an embedding run has been saved.
pub fn get_run_meta(conn: &Connection) -> Result<Option<RunMeta>> {
    let mut stmt = conn.prepare(
        "SELECT model, dimension, sample_size, seed, source, embedded_at
         FROM run_meta WHERE id = 1",
    )?;
    let result = stmt
        .query_row([], |row| {
            Ok(RunMeta {
                model: row.get(0)?,
                dimension: row.get::<_, i64>(1)? as usize,
                sample_size: row.get::<_, i64>(2)? as usize,
                seed: row.get::<_, i64>(3)? as u64,
                source: row.get(4)?,
                embedded_at: row.get(5)?,
            })
        })
        .optional()?;
    Ok(result)
}

// --- Records ---

/// Replace the stored run with `records` and their `vectors`.
///
/// Runs in a single transaction: either the whole run is stored or the
/// previous one is left untouched.
pub fn save_run(
    conn: &Connection,
    meta: &RunMeta,
    records: &[Record],
    vectors: &[Vec<f64>],
) -> Result<()> {
    if records.len() != vectors.len() {
        anyhow::bail!(
            "Refusing to store {} records with {} vectors",
            records.len(),
            vectors.len()
        );
    }

    let tx = conn.unchecked_transaction()?;

    tx.execute("DELETE FROM records", [])?;
    tx.execute(
        "INSERT INTO run_meta (id, model, dimension, sample_size, seed, source, embedded_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            model = ?1,
            dimension = ?2,
            sample_size = ?3,
            seed = ?4,
            source = ?5,
            embedded_at = ?6",
        params![
            meta.model,
            meta.dimension as i64,
            meta.sample_size as i64,
            meta.seed as i64,
            meta.source,
            meta.embedded_at,
        ],
    )?;

    {
        let mut stmt = tx.prepare(
            "INSERT INTO records (position, id, title, text, language, rating, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for (position, (record, vector)) in records.iter().zip(vectors).enumerate() {
            let embedding = serde_json::to_string(vector)?;
            stmt.execute(params![
                position as i64,
                record.id,
                record.title,
                record.text,
                record.language,
                record.rating,
                embedding,
            ])?;
        }
    }

    tx.commit().context("Failed to commit embedding run")?;
    Ok(())
}

/// Load all stored records and vectors in position order.
pub fn get_records(conn: &Connection) -> Result<(Vec<Record>, Vec<Vec<f64>>)> {
    let mut stmt = conn.prepare(
        "SELECT id, title, text, language, rating, embedding
         FROM records ORDER BY position",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            Record {
                id: row.get(0)?,
                title: row.get(1)?,
                text: row.get(2)?,
                language: row.get(3)?,
                rating: row.get(4)?,
            },
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut records = Vec::new();
    let mut vectors = Vec::new();
    for row in rows {
        let (record, json) = row?;
        let vector: Vec<f64> = serde_json::from_str(&json)
            .with_context(|| format!("Corrupt embedding for record {}", record.id))?;
        records.push(record);
        vectors.push(vector);
    }

    Ok((records, vectors))
}

/// Number of stored records.
pub fn record_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
    Ok(count)
}
