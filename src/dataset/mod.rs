// Dataset layer: the horror-movie table, its filter, and the seeded sample.
//
// The embedding pipeline only ever sees `Record`s: typed rows with an
// identifier and the overview text that gets embedded. Everything about the
// source file layout stays in loader.rs.

pub mod download;
pub mod loader;
pub mod sample;

use serde::{Deserialize, Serialize};

/// One movie whose overview will be embedded. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Source identifier (TMDB id in the horror-movies table)
    pub id: String,
    pub title: String,
    /// The free-text overview that gets embedded
    pub text: String,
    /// ISO 639-1 language code of the original release
    pub language: String,
    /// Average vote, if the source had one
    pub rating: Option<f64>,
}

impl Record {
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            language: "en".to_string(),
            rating: None,
        }
    }
}
