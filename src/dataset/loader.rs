// Dataset loading: CSV (the TidyTuesday layout) or an equivalent JSON array.
//
// Only five columns matter: id, title, overview, original_language and
// vote_average. Anything else in the file is ignored. Rows that survive the
// English/non-empty filter become `Record`s in file order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use super::Record;

/// Language code kept by the filter.
pub const ENGLISH: &str = "en";

/// A raw row from the source table, before filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieRow {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub original_language: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub vote_average: Option<f64>,
}

/// The source uses integer ids; JSON exports sometimes quote them.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Number(n) => n.to_string(),
        Id::Text(s) => s,
    })
}

/// Load the table at `path` and return the filtered records.
///
/// Files ending in `.json` are read as a JSON array of rows; everything else
/// is treated as CSV with a header line.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset at {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let rows = if is_json {
        read_json(file)
    } else {
        read_csv(file)
    }
    .with_context(|| format!("Failed to parse dataset at {}", path.display()))?;

    let total = rows.len();
    let records = filter_english(rows);

    info!(
        path = %path.display(),
        rows = total,
        kept = records.len(),
        "Loaded dataset"
    );

    Ok(records)
}

/// Parse CSV rows (header line required).
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<MovieRow>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut rows = Vec::new();
    for (line, row) in rdr.deserialize::<MovieRow>().enumerate() {
        // +2: one for the header, one for 1-based line numbers
        let row = row.with_context(|| format!("Malformed CSV row at line {}", line + 2))?;
        rows.push(row);
    }

    debug!(rows = rows.len(), "Parsed CSV rows");
    Ok(rows)
}

/// Parse a JSON array of row objects.
pub fn read_json<R: Read>(reader: R) -> Result<Vec<MovieRow>> {
    let rows: Vec<MovieRow> =
        serde_json::from_reader(reader).context("Expected a JSON array of movie rows")?;
    debug!(rows = rows.len(), "Parsed JSON rows");
    Ok(rows)
}

/// Keep English-language rows with a non-blank overview, in input order.
pub fn filter_english(rows: Vec<MovieRow>) -> Vec<Record> {
    rows.into_iter()
        .filter(|row| row.original_language == ENGLISH)
        .filter_map(|row| {
            let text = row.overview.as_deref().map(str::trim).unwrap_or("");
            if text.is_empty() {
                return None;
            }
            Some(Record {
                id: row.id,
                title: row.title,
                text: text.to_string(),
                language: row.original_language,
                rating: row.vote_average,
            })
        })
        .collect()
}
