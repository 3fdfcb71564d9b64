// Composition tests: verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   dataset file -> sample -> EmbeddingStore -> SQLite -> similarity + PCA -> exports
// with a scripted provider standing in for the network. Fixture and export
// files are written to the system temp dir.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use dreadmap::db::schema::create_tables;
use dreadmap::db::sqlite::SqliteDatabase;
use dreadmap::db::Database;
use dreadmap::embeddings::EmbeddingProvider;
use dreadmap::error::{PipelineError, PipelineResult};
use dreadmap::output::export::{save_projection_csv, save_rankings_json};
use dreadmap::pipeline::analyze;
use dreadmap::pipeline::embed::{self, EmbedOptions};
use dreadmap::projection::ProjectionOptions;
use dreadmap::similarity::ZeroVectorPolicy;
use rusqlite::Connection;

/// Embeds text by keyword: "ghost", "slasher", and "zombie" each light up
/// one axis, so overviews about the same thing land close together.
struct KeywordProvider;

const KEYWORDS: [&str; 3] = ["ghost", "slasher", "zombie"];

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    async fn embed_batch(&self, _model: &str, texts: &[String]) -> PipelineResult<Vec<Vec<f64>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                let mut v: Vec<f64> = KEYWORDS
                    .iter()
                    .map(|k| if lower.contains(k) { 1.0 } else { 0.05 })
                    .collect();
                v.push(t.len() as f64 / 1000.0);
                v
            })
            .collect())
    }
}

struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed_batch(&self, _model: &str, _texts: &[String]) -> PipelineResult<Vec<Vec<f64>>> {
        Err(PipelineError::ProviderError("connection timed out".to_string()))
    }
}

const MOVIES_CSV: &str = "\
id,title,original_language,overview,vote_average
1,Lantern House,en,A ghost haunts the lighthouse keeper's family.,6.1
2,Grave Shift,en,Night nurses fight a zombie outbreak in the hospital.,5.4
3,Summer Camp Nine,en,A masked slasher stalks the counselors at a lake camp.,5.9
4,The Hollow Bride,en,The ghost of a bride walks the manor every winter.,6.8
5,Dead Acre,en,Farmers barricade themselves against a zombie horde.,6.0
6,Night Blade,en,A slasher returns to the town where he was born.,5.2
7,La Casa,es,A ghost in a Spanish villa.,6.5
8,Untitled,en,,4.0
";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "dreadmap_composition_{}_{}",
        std::process::id(),
        name
    ))
}

fn memory_db() -> SqliteDatabase {
    let conn = Connection::open_in_memory().unwrap();
    create_tables(&conn).unwrap();
    SqliteDatabase::new(conn)
}

fn options(sample_size: usize) -> EmbedOptions {
    EmbedOptions {
        model: "keyword-test".to_string(),
        expected_dim: Some(4),
        sample_size,
        seed: 42,
    }
}

// ============================================================
// Chain: CSV -> embed -> store -> reload
// ============================================================

#[tokio::test]
async fn embed_run_filters_and_persists() {
    let source = temp_path("embed.csv");
    std::fs::write(&source, MOVIES_CSV).unwrap();
    let db = memory_db();

    let (meta, store) = embed::run(&KeywordProvider, &db, &source, &options(1000))
        .await
        .unwrap();
    std::fs::remove_file(&source).ok();

    // the Spanish row and the empty overview are filtered out
    assert_eq!(store.len(), 6);
    assert_eq!(meta.dimension, 4);
    assert_eq!(meta.model, "keyword-test");

    let (loaded_meta, loaded) = db.load_run().await.unwrap().unwrap();
    assert_eq!(loaded_meta, meta);
    assert_eq!(loaded.records(), store.records());
    assert_eq!(loaded.vectors(), store.vectors());
}

#[tokio::test]
async fn failed_embed_keeps_previous_run() {
    let source = temp_path("failed.csv");
    std::fs::write(&source, MOVIES_CSV).unwrap();
    let db = memory_db();

    let (first, _) = embed::run(&KeywordProvider, &db, &source, &options(1000))
        .await
        .unwrap();

    let err = embed::run(&FailingProvider, &db, &source, &options(1000))
        .await
        .unwrap_err();
    std::fs::remove_file(&source).ok();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::ProviderError(_))
    ));
    assert_eq!(db.get_run_meta().await.unwrap(), Some(first));
    assert_eq!(db.record_count().await.unwrap(), 6);
}

#[tokio::test]
async fn embed_respects_sample_size() {
    let source = temp_path("sampled.csv");
    std::fs::write(&source, MOVIES_CSV).unwrap();
    let db = memory_db();

    let (meta, store) = embed::run(&KeywordProvider, &db, &source, &options(3))
        .await
        .unwrap();
    std::fs::remove_file(&source).ok();

    assert_eq!(store.len(), 3);
    assert_eq!(meta.sample_size, 3);
    assert_eq!(db.record_count().await.unwrap(), 3);
}

// ============================================================
// Chain: store -> similarity + projection -> exports
// ============================================================

#[tokio::test]
async fn analysis_groups_overviews_by_theme() {
    let source = temp_path("analyze.csv");
    std::fs::write(&source, MOVIES_CSV).unwrap();
    let db = memory_db();
    embed::run(&KeywordProvider, &db, &source, &options(1000))
        .await
        .unwrap();
    std::fs::remove_file(&source).ok();

    let (_, store) = db.load_run().await.unwrap().unwrap();
    let matrix = Arc::new(store.assemble_matrix().unwrap());

    // neighbors is clamped to N - 1 = 5
    let analysis = analyze::run(
        Arc::clone(&matrix),
        50,
        2,
        ZeroVectorPolicy::Reject,
        ProjectionOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(analysis.rankings.len(), 6);
    assert!(analysis.rankings.iter().all(|r| r.len() == 5));

    // each overview's closest match shares its keyword
    let ghost = store.position_of("1").unwrap();
    let ghost_twin = store.position_of("4").unwrap();
    assert_eq!(analysis.rankings[ghost][0].index, ghost_twin);

    let zombie = store.position_of("2").unwrap();
    let zombie_twin = store.position_of("5").unwrap();
    assert_eq!(analysis.rankings[zombie][0].index, zombie_twin);

    let single = analyze::similar_to(&matrix, ghost, 1, ZeroVectorPolicy::Reject).unwrap();
    assert_eq!(single, vec![analysis.rankings[ghost][0]]);

    assert_eq!(analysis.projection.coordinates().dim(), (6, 2));

    let rankings_path = temp_path("rankings.json");
    let projection_path = temp_path("projection.csv");
    save_rankings_json(&rankings_path, store.records(), &analysis.rankings).unwrap();
    save_projection_csv(&projection_path, store.records(), &analysis.projection).unwrap();

    let rankings: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&rankings_path).unwrap()).unwrap();
    assert_eq!(rankings[ghost]["id"], "1");
    assert_eq!(rankings[ghost]["neighbors"][0]["id"], "4");

    let table = std::fs::read_to_string(&projection_path).unwrap();
    assert_eq!(table.lines().next(), Some("id,title,rating,pc1,pc2"));
    assert_eq!(table.lines().count(), 7);

    std::fs::remove_file(&rankings_path).ok();
    std::fs::remove_file(&projection_path).ok();
}

#[tokio::test]
async fn analysis_surfaces_invalid_component_count() {
    let matrix = Arc::new(
        dreadmap::embeddings::EmbeddingMatrix::from_rows(&[
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ])
        .unwrap(),
    );

    let err = analyze::run(
        matrix,
        1,
        3,
        ZeroVectorPolicy::Reject,
        ProjectionOptions::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::InvalidParameter(_))
    ));
}
