// Exported artifacts for external tools (plotting, notebooks).
//
// - projection.csv: one row per record, metadata joined by row position,
//   followed by one column per principal component.
// - rankings.json: every record with its ranked neighbors.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::dataset::Record;
use crate::projection::ProjectionResult;
use crate::similarity::Neighbor;

/// Write the projection table to any writer.
pub fn write_projection_csv<W: Write>(
    writer: W,
    records: &[Record],
    projection: &ProjectionResult,
) -> Result<()> {
    let coords = projection.coordinates();
    if coords.nrows() != records.len() {
        anyhow::bail!(
            "Projection has {} rows but there are {} records",
            coords.nrows(),
            records.len()
        );
    }

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["id".to_string(), "title".to_string(), "rating".to_string()];
    header.extend((1..=coords.ncols()).map(|i| format!("pc{i}")));
    wtr.write_record(&header)?;

    for (record, row) in records.iter().zip(coords.rows()) {
        let mut fields = vec![
            record.id.clone(),
            record.title.clone(),
            record.rating.map(|r| r.to_string()).unwrap_or_default(),
        ];
        fields.extend(row.iter().map(|v| v.to_string()));
        wtr.write_record(&fields)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the projection table to `path`.
pub fn save_projection_csv(
    path: &Path,
    records: &[Record],
    projection: &ProjectionResult,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_projection_csv(file, records, projection)?;
    info!(path = %path.display(), rows = records.len(), "Wrote projection table");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct RankingEntry<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub neighbors: Vec<RankedNeighbor<'a>>,
}

#[derive(Debug, Serialize)]
pub struct RankedNeighbor<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub score: f64,
}

/// Resolve neighbor positions back to record ids and titles.
pub fn ranking_entries<'a>(
    records: &'a [Record],
    rankings: &[Vec<Neighbor>],
) -> Vec<RankingEntry<'a>> {
    records
        .iter()
        .zip(rankings)
        .map(|(record, neighbors)| RankingEntry {
            id: &record.id,
            title: &record.title,
            neighbors: neighbors
                .iter()
                .map(|n| RankedNeighbor {
                    id: &records[n.index].id,
                    title: &records[n.index].title,
                    score: n.score,
                })
                .collect(),
        })
        .collect()
}

/// Write the rankings as pretty-printed JSON to `path`.
pub fn save_rankings_json(
    path: &Path,
    records: &[Record],
    rankings: &[Vec<Neighbor>],
) -> Result<()> {
    let entries = ranking_entries(records, rankings);
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &entries)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), records = entries.len(), "Wrote rankings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbeddingMatrix;
    use crate::projection::project;

    fn records() -> Vec<Record> {
        vec![
            Record {
                rating: Some(6.5),
                ..Record::new("10", "Hereditary", "a")
            },
            Record::new("11", "Midsommar", "b"),
            Record::new("12", "The Witch", "c"),
        ]
    }

    #[test]
    fn test_projection_csv_layout() {
        let m = EmbeddingMatrix::from_rows(&[
            vec![1.0, 0.0, 2.0],
            vec![0.0, 1.0, 1.0],
            vec![2.0, 2.0, 0.0],
        ])
        .unwrap();
        let p = project(&m, 2).unwrap();

        let mut buf = Vec::new();
        write_projection_csv(&mut buf, &records(), &p).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "id,title,rating,pc1,pc2");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("10,Hereditary,6.5,"));
        assert!(lines[2].starts_with("11,Midsommar,,"));
    }

    #[test]
    fn test_ranking_entries_resolve_ids() {
        let rankings = vec![
            vec![Neighbor { index: 2, score: 0.9 }],
            vec![Neighbor { index: 0, score: 0.5 }],
            vec![Neighbor { index: 1, score: 0.1 }],
        ];
        let recs = records();
        let entries = ranking_entries(&recs, &rankings);
        assert_eq!(entries[0].neighbors[0].id, "12");
        assert_eq!(entries[1].neighbors[0].title, "Hereditary");

        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[2]["neighbors"][0]["score"], 0.1);
    }
}
